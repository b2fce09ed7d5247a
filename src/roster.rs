//! Roster views
//!
//! Flat list views over the record snapshot: name search, the deceased
//! list, the branch roster in family order, ages and the placement a new
//! member inherits from its chosen parent.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use family_types::{BranchId, Member};

use crate::config::BranchConfig;
use crate::hierarchy::{group_by_branch, BranchGroup};
use crate::records::RecordIndex;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Case-insensitive substring search on family name + given name.
/// An empty query matches everyone.
pub fn search<'a>(members: &'a [Member], query: &str) -> Vec<&'a Member> {
    let query = query.trim().to_lowercase();
    members
        .iter()
        .filter(|m| query.is_empty() || m.search_key().contains(&query))
        .collect()
}

/// Deceased members in record order
pub fn deceased(members: &[Member]) -> Vec<&Member> {
    members.iter().filter(|m| m.is_deceased()).collect()
}

/// Branch roster: search results grouped by branch, each in family order
pub fn members_by_branch<'a>(
    index: &'a RecordIndex,
    query: Option<&str>,
    branches: &BranchConfig,
) -> Vec<BranchGroup<'a>> {
    let matches = search(index.members(), query.unwrap_or_default());
    group_by_branch(index, matches, branches)
}

// =============================================================================
// AGE
// =============================================================================

/// Full years between `birth` and `end` (or `today` when `end` is missing).
///
/// `None` when the birth date is missing or unparsable, or lies after the end.
pub fn age_on(birth: Option<&str>, end: Option<&str>, today: NaiveDate) -> Option<u32> {
    let birth = NaiveDate::parse_from_str(birth?.trim(), DATE_FORMAT).ok()?;
    let end = match end {
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()?,
        None => today,
    };
    if end < birth {
        return None;
    }

    let mut years = end.year() - birth.year();
    if (end.month(), end.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

/// Age today, or age at death for deceased members
pub fn member_age(member: &Member, today: NaiveDate) -> Option<u32> {
    let end = if member.is_deceased() {
        member.passed_at.as_deref()
    } else {
        None
    };
    age_on(member.birth_date.as_deref(), end, today)
}

// =============================================================================
// PLACEMENT AND LABELS
// =============================================================================

/// Generation and branch a new member inherits from its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub generation: u32,
    /// `None` when the parent is the founder: the branch must be chosen manually
    pub branch_id: Option<BranchId>,
}

/// Placement for a child of `parent_id`; `None` when the parent is unknown or
/// its generation cannot be incremented
pub fn placement_for_parent(index: &RecordIndex, parent_id: &str) -> Option<Placement> {
    let Some(parent) = index.get(parent_id) else {
        tracing::warn!(parent_id, "parent not found");
        return None;
    };

    let Some(generation) = parent.generation.checked_add(1) else {
        tracing::warn!(parent_id, generation = parent.generation, "parent generation out of range");
        return None;
    };

    Some(Placement {
        generation,
        branch_id: if parent.is_founder() {
            None
        } else {
            Some(parent.branch())
        },
    })
}

pub fn display_name(member: &Member) -> String {
    member.display_name()
}

/// `"Last First (generation N - Label)"` for a parent picker
pub fn parent_display_name(
    index: &RecordIndex,
    parent_id: &str,
    branches: &BranchConfig,
) -> Option<String> {
    let parent = index.get(parent_id)?;
    Some(format!(
        "{} (generation {} - {})",
        parent.display_name(),
        parent.generation,
        branches.label(parent.branch())
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, DATE_FORMAT).unwrap()
    }

    fn members() -> Vec<Member> {
        vec![
            Member::new("f", "Yamada", "Taro", 1).deceased(Some("1990-03-01")),
            Member::new("c", "Yamada", "Hanako", 2).with_parent("f").with_branch(1),
            Member::new("d", "Suzuki", "Ichiro", 2).with_parent("f").with_branch(2),
            Member::new("g", "Suzuki", "Jiro", 3).with_parent("d").with_branch(2),
        ]
    }

    #[test]
    fn test_search_case_insensitive() {
        let members = vec![Member::new("a", "YAMADA", "Taro", 2), Member::new("b", "Suzuki", "Jiro", 2)];
        let found: Vec<&str> = search(&members, "yamadat").iter().map(|m| m.id.as_str()).collect();
        assert_eq!(found, vec!["a"]);
        assert_eq!(search(&members, "  ").len(), 2);
        assert!(search(&members, "kato").is_empty());
    }

    #[test]
    fn test_deceased() {
        let members = members();
        let ids: Vec<&str> = deceased(&members).iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["f"]);
    }

    #[test]
    fn test_members_by_branch_with_query() {
        let index = RecordIndex::build(members());
        let groups = members_by_branch(&index, Some("suzuki"), &BranchConfig::default());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].branch_id, 2);
        let ids: Vec<&str> = groups[0].members.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["d", "g"]);

        assert_eq!(members_by_branch(&index, None, &BranchConfig::default()).len(), 3);
    }

    #[test]
    fn test_age_on() {
        let today = date("2024-06-15");
        assert_eq!(age_on(Some("1950-06-15"), None, today), Some(74));
        assert_eq!(age_on(Some("1950-06-16"), None, today), Some(73));
        assert_eq!(age_on(Some("1920-01-01"), Some("1990-03-01"), today), Some(70));
        assert_eq!(age_on(None, None, today), None);
        assert_eq!(age_on(Some("not a date"), None, today), None);
        assert_eq!(age_on(Some("2030-01-01"), None, today), None);
    }

    #[test]
    fn test_member_age_uses_passed_at() {
        let member = Member::new("f", "Yamada", "Taro", 1)
            .with_birth_date("1900-05-01")
            .deceased(Some("1980-04-30"));
        assert_eq!(member_age(&member, date("2024-01-01")), Some(79));
    }

    #[test]
    fn test_placement_for_parent() {
        let index = RecordIndex::build(members());
        assert_eq!(
            placement_for_parent(&index, "f"),
            Some(Placement { generation: 2, branch_id: None })
        );
        assert_eq!(
            placement_for_parent(&index, "d"),
            Some(Placement { generation: 3, branch_id: Some(2) })
        );
        assert_eq!(placement_for_parent(&index, "missing"), None);
    }

    #[test]
    fn test_placement_generation_overflow() {
        let index = RecordIndex::build(vec![Member::new("x", "Yamada", "Edge", u32::MAX)]);
        assert_eq!(placement_for_parent(&index, "x"), None);
    }

    #[test]
    fn test_parent_display_name() {
        let index = RecordIndex::build(members());
        let mut branches = BranchConfig::default();
        branches.labels.insert(2, "Suzuki line".to_string());

        assert_eq!(
            parent_display_name(&index, "d", &branches).as_deref(),
            Some("Suzuki Ichiro (generation 2 - Suzuki line)")
        );
        assert_eq!(
            parent_display_name(&index, "f", &branches).as_deref(),
            Some("Yamada Taro (generation 1 - Founder)")
        );
        assert_eq!(display_name(&index.members()[1]), "Yamada Hanako");
    }
}
