//! End-to-end behaviour of record resolution, layout and the session API.

use pretty_assertions::assert_eq;
use std::time::Duration;

use family_forest::config::{ForestConfig, HierarchyConfig, LayoutConfig};
use family_forest::hierarchy::{build_hierarchy, group_by_branch, DataQualityWarning};
use family_forest::layout::{EdgeKind, ExpansionState, LayoutEngine, LayoutTree};
use family_forest::{
    parse_records, FamilyTreeSession, LayoutPass, Member, MemberId, RecordIndex, SessionError,
    TreeStatus,
};

fn ids<'a>(members: impl IntoIterator<Item = &'a Member>) -> Vec<&'a str> {
    members.into_iter().map(|m| m.id.as_str()).collect()
}

// =============================================================================
// RESOLUTION SCENARIOS
// =============================================================================

#[test]
fn incoming_spouse_attaches_beside_child() {
    let index = RecordIndex::build(vec![
        Member::new("F", "Sato", "Founder", 1),
        Member::new("C", "Sato", "Child", 2).with_parent("F").with_spouse("S"),
        Member::new("S", "Ito", "Spouse", 2).with_spouse("C"),
    ]);
    let tree = build_hierarchy(&index, &HierarchyConfig::default()).unwrap();

    assert_eq!(tree.roots.len(), 1);
    let root = &tree.roots[0];
    assert_eq!(root.id().as_str(), "F");
    assert_eq!(root.children.len(), 1);

    let child = &root.children[0];
    assert_eq!(child.id().as_str(), "C");
    assert_eq!(
        child.attached_spouse.as_ref().map(|s| s.id().as_str()),
        Some("S")
    );
    assert!(child.children.is_empty());
    assert_eq!(tree.node_count(), 2);
}

#[test]
fn mutual_sibling_spouses_resolve_to_one_child() {
    let index = RecordIndex::build(vec![
        Member::new("F", "Sato", "Founder", 1),
        Member::new("C1", "Sato", "One", 2).with_parent("F").with_spouse("C2"),
        Member::new("C2", "Sato", "Two", 2).with_parent("F").with_spouse("C1"),
    ]);
    let tree = build_hierarchy(&index, &HierarchyConfig::default()).unwrap();
    let root = &tree.roots[0];

    // Exactly one stays a child; the other is attached to it
    assert_eq!(root.children.len(), 1);
    let kept = &root.children[0];
    let attached = kept.attached_spouse.as_ref().unwrap();
    let mut pair = vec![kept.id().as_str(), attached.id().as_str()];
    pair.sort();
    assert_eq!(pair, vec!["C1", "C2"]);
    assert_eq!(tree.member_count(), 3);

    let warnings = family_forest::hierarchy::audit(&index);
    assert!(warnings
        .iter()
        .any(|w| matches!(w, DataQualityWarning::SiblingSpousePair { .. })));
}

#[test]
fn branch_order_is_birth_date_ascending() {
    let index = RecordIndex::build(vec![
        Member::new("F", "Sato", "Founder", 1),
        Member::new("late", "Sato", "Late", 2).with_parent("F").with_birth_date("1955-01-01"),
        Member::new("early", "Sato", "Early", 2).with_parent("F").with_birth_date("1950-01-01"),
    ]);
    let groups = group_by_branch(&index, index.members(), &Default::default());

    assert_eq!(groups.len(), 1);
    assert_eq!(ids(groups[0].members.iter().copied()), vec!["F", "early", "late"]);
}

#[test]
fn self_and_dangling_spouses_render_without_partner() {
    let mut session = FamilyTreeSession::new(ForestConfig::default());
    session.rebuild(vec![
        Member::new("F", "Sato", "Founder", 1).with_spouse("F"),
        Member::new("A", "Sato", "A", 2).with_parent("F").with_spouse("ghost"),
    ]);
    session.toggle("F").unwrap();
    session.toggle("F").unwrap();

    assert!(session.visible_nodes().iter().all(|n| !n.has_attached_spouse));
    assert!(session.edges().iter().all(|e| e.kind == EdgeKind::ParentChild));
    assert!(session
        .warnings()
        .contains(&DataQualityWarning::SelfSpouse { id: MemberId::from("F") }));
}

#[test]
fn store_snapshot_with_legacy_values() {
    let records = parse_records(
        r#"[
            {"id": "f", "lastName": "Sato", "firstName": "Ichiro", "generation": 1,
             "registry": "tengoku", "parentId": "", "spouseId": null},
            {"id": "c", "lastName": "Sato", "firstName": "Jiro", "generation": 2,
             "registry": "magomago", "parentId": "f", "branchId": 1}
        ]"#,
    )
    .unwrap();

    let mut session = FamilyTreeSession::new(ForestConfig::default());
    assert_eq!(session.rebuild(records), TreeStatus::Ready { roots: 1, nodes: 2 });

    let nodes = session.visible_nodes();
    assert_eq!(nodes[0].label, "Sato Ichiro");
    assert!(nodes[0].is_deceased);
    assert!(!nodes[1].is_deceased);
}

// =============================================================================
// LAYOUT AND SESSION
// =============================================================================

fn extended_family() -> Vec<Member> {
    vec![
        Member::new("f", "Sato", "Ichiro", 1).with_spouse("w"),
        Member::new("w", "Sato", "Ume", 1),
        Member::new("a", "Sato", "A", 2).with_parent("f").with_birth_date("1950-01-01"),
        Member::new("b", "Sato", "B", 2).with_parent("f").with_birth_date("1952-01-01"),
        Member::new("as", "Kato", "AS", 2).with_spouse("a"),
        Member::new("a1", "Sato", "A1", 3).with_parent("a"),
        Member::new("a2", "Sato", "A2", 3).with_parent("as"),
        Member::new("b1", "Sato", "B1", 3).with_parent("b"),
        Member::new("a11", "Sato", "A11", 4).with_parent("a1"),
        Member::new("a111", "Sato", "A111", 5).with_parent("a11"),
    ]
}

#[test]
fn toggle_restores_identical_children() {
    let index = RecordIndex::build(extended_family());
    let tree = build_hierarchy(&index, &HierarchyConfig::default()).unwrap();
    let mut layout = LayoutTree::from_family_tree(&tree);
    let a = layout.lookup("a").unwrap();

    layout.toggle(a);
    let before = layout.node(a).unwrap().state.children().as_ptr();
    let before_ids = layout.node(a).unwrap().state.children().to_vec();

    assert_eq!(layout.toggle(a), Some(ExpansionState::Collapsed));
    assert_eq!(layout.toggle(a), Some(ExpansionState::Expanded));

    let children = layout.node(a).unwrap().state.children();
    assert!(std::ptr::eq(children.as_ptr(), before));
    assert_eq!(children, before_ids.as_slice());
}

#[test]
fn cascade_reveals_one_level_per_delay() {
    let mut config = ForestConfig::default();
    config.cascade.level_delay_ms = 100;
    let mut session = FamilyTreeSession::new(config);
    let receiver = session.subscribe(32);
    session.rebuild(extended_family());
    assert_eq!(session.visible_nodes().len(), 3);

    assert_eq!(session.request_cascade_expand(), Ok(3));
    assert_eq!(session.visible_nodes().len(), 6);
    assert_eq!(session.toggle("a"), Err(SessionError::CascadeInProgress));

    assert_eq!(session.advance(Duration::from_millis(50)), 0);
    assert_eq!(session.advance(Duration::from_millis(50)), 1);
    assert_eq!(session.visible_nodes().len(), 7);
    assert!(session.is_animating());

    assert_eq!(session.advance(Duration::from_millis(100)), 1);
    assert_eq!(session.visible_nodes().len(), 8);
    assert!(!session.is_animating());

    let passes: Vec<LayoutPass> = receiver.drain().into_iter().map(|e| e.pass).collect();
    assert_eq!(
        passes,
        vec![
            LayoutPass::Rebuilt,
            LayoutPass::CascadeStep { level: 1, remaining: 2 },
            LayoutPass::CascadeStep { level: 2, remaining: 1 },
            LayoutPass::CascadeStep { level: 3, remaining: 0 },
        ]
    );

    session.request_collapse_all().unwrap();
    assert_eq!(session.visible_nodes().len(), 3);
}

#[test]
fn rebuild_cancels_cascade_and_resets() {
    let mut session = FamilyTreeSession::new(ForestConfig::default());
    session.rebuild(extended_family());
    session.request_cascade_expand().unwrap();
    assert!(session.is_animating());

    session.rebuild(extended_family());
    assert!(!session.is_animating());
    assert_eq!(session.advance(Duration::from_secs(10)), 0);
    assert_eq!(session.visible_nodes().len(), 3);
}

#[test]
fn root_partnership_is_centered() {
    let mut session = FamilyTreeSession::new(ForestConfig::default());
    session.rebuild(extended_family());
    session.toggle("a").unwrap();

    let root = &session.visible_nodes()[0];
    assert!(root.has_attached_spouse);
    let viewport = session.viewport();
    let (screen_x, _) = viewport.apply(root.x, root.y);
    let width = session.config().viewport.width;
    assert!((screen_x - width / 2.0).abs() < 1e-3);
    assert!(viewport.scale >= 0.3 && viewport.scale <= 3.0);
}

#[test]
fn no_founder_yields_placeholder() {
    let mut session = FamilyTreeSession::new(ForestConfig::default());
    let status = session.rebuild(vec![Member::new("x", "Sato", "X", 3)]);

    assert_eq!(status, TreeStatus::NoFounder);
    assert!(session.visible_nodes().is_empty());
    assert_eq!(session.request_cascade_expand(), Err(SessionError::NoTree));
    assert_eq!(session.warnings(), &[DataQualityWarning::NoFounder]);
}

#[test]
fn sample_config_matches_defaults() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("config/family_tree.yaml");
    let config = ForestConfig::load_from_file(&path).unwrap();
    let defaults = ForestConfig::default();

    assert_eq!(config.layout, defaults.layout);
    assert_eq!(config.cascade, defaults.cascade);
    assert_eq!(config.viewport, defaults.viewport);
    assert_eq!(config.hierarchy, defaults.hierarchy);
    assert_eq!(config.branches.label(2), "Second son line");
    assert_eq!(config.branches.label(0), "Founder");
}

// =============================================================================
// PROPERTIES
// =============================================================================

mod proptests {
    use super::*;
    use proptest::prelude::*;
    use proptest::sample::Index;

    /// (parent pick, wants spouse, birth year, mutual link)
    type MemberPlan = (Index, bool, Option<u16>, bool);

    /// A founder plus blood descendants; some blood members get exactly one
    /// married-in spouse without a parent record.
    fn build_family(plans: Vec<MemberPlan>) -> (Vec<Member>, usize) {
        let mut members = vec![Member::new("m0", "Sato", "0", 1)];
        let mut blood: Vec<usize> = vec![0];
        let mut has_spouse = vec![false];

        for (i, (pick, wants_spouse, year, mutual)) in plans.into_iter().enumerate() {
            let id = format!("m{}", i + 1);
            let partner = blood[pick.index(blood.len())];

            if wants_spouse && !has_spouse[partner] {
                has_spouse[partner] = true;
                let partner_id = members[partner].id.clone();
                let generation = members[partner].generation.max(2);
                if mutual {
                    members[partner].spouse_id = Some(MemberId::from(id.as_str()));
                }
                members.push(Member::new(id.as_str(), "Kato", "S", generation).with_spouse(partner_id));
                has_spouse.push(true);
            } else {
                let parent_id = members[partner].id.clone();
                let generation = members[partner].generation + 1;
                let mut child = Member::new(id.as_str(), "Sato", "C", generation).with_parent(parent_id);
                if let Some(year) = year {
                    child = child.with_birth_date(format!("{}-01-01", year));
                }
                blood.push(members.len());
                members.push(child);
                has_spouse.push(false);
            }
        }

        (members, blood.len())
    }

    fn arb_family() -> impl Strategy<Value = (Vec<Member>, usize)> {
        prop::collection::vec(
            (any::<Index>(), any::<bool>(), prop::option::of(1900u16..2020), any::<bool>()),
            0..24,
        )
        .prop_map(build_family)
    }

    proptest! {
        #[test]
        fn node_count_matches_blood_line((members, blood) in arb_family()) {
            let total = members.len();
            let index = RecordIndex::build(members);
            let tree = build_hierarchy(&index, &HierarchyConfig::default()).unwrap();

            prop_assert_eq!(tree.node_count(), blood);
            prop_assert_eq!(tree.member_count(), total);
            let has_unreachable = tree
                .warnings
                .iter()
                .any(|w| matches!(w, DataQualityWarning::Unreachable { .. }));
            prop_assert!(!has_unreachable);
        }

        #[test]
        fn rebuild_is_idempotent((members, _) in arb_family()) {
            let mut session = FamilyTreeSession::new(ForestConfig::default());
            session.rebuild(members.clone());
            session.request_cascade_expand().unwrap();
            session.advance(Duration::from_secs(60));
            session.request_collapse_all().unwrap();
            let first = session.snapshot().clone();

            session.rebuild(members);
            prop_assert_eq!(session.snapshot(), &first);
        }

        #[test]
        fn sibling_spans_never_overlap(
            (members, _) in arb_family(),
            toggles in prop::collection::vec(any::<bool>(), 32),
        ) {
            let index = RecordIndex::build(members);
            let tree = build_hierarchy(&index, &HierarchyConfig::default()).unwrap();
            let mut layout = LayoutTree::from_family_tree(&tree);
            for (idx, toggle) in toggles.iter().enumerate().take(layout.len()) {
                if *toggle {
                    layout.toggle(idx);
                }
            }

            let config = LayoutConfig::default();
            let gap = config.sibling_gap;
            let engine = LayoutEngine::new(config);
            engine.layout(&mut layout);

            for idx in layout.visible() {
                let children = layout.node(idx).unwrap().state.visible_children().to_vec();
                for pair in children.windows(2) {
                    let left = engine.subtree_span(&layout, pair[0]).unwrap();
                    let right = engine.subtree_span(&layout, pair[1]).unwrap();
                    prop_assert!(left.right + gap <= right.left + 1e-3);
                }

                if !children.is_empty() {
                    let node = layout.node(idx).unwrap();
                    let first = engine.subtree_span(&layout, children[0]).unwrap();
                    let last = engine.subtree_span(&layout, children[children.len() - 1]).unwrap();
                    prop_assert!(node.x >= first.left - 1e-3 && node.x <= last.right + 1e-3);
                }
            }
        }
    }
}
