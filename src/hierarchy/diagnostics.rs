//! Data-quality diagnostics
//!
//! Malformed relational data never aborts resolution. Instead every anomaly
//! found while indexing or building the tree is surfaced as a
//! [`DataQualityWarning`] and logged. Nothing here corrects the data.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use family_types::{Member, MemberId};

use crate::config::HierarchyConfig;
use crate::records::{MarriageResolver, RecordIndex};

use super::builder::build_hierarchy;

// =============================================================================
// SEVERITY
// =============================================================================

/// Severity level for data-quality warnings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Tolerated and rendered correctly, worth tidying
    Info,
    /// Rendered with a fallback, should be reviewed
    Warn,
    /// Part of the data cannot be shown
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warn => write!(f, "warn"),
            Severity::Error => write!(f, "error"),
        }
    }
}

// =============================================================================
// WARNINGS
// =============================================================================

/// A data-quality finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataQualityWarning {
    /// No generation-1 member exists
    NoFounder,
    /// More than one generation-1 root; extra trees are laid out to the right
    MultipleFounders { ids: Vec<MemberId> },
    /// `parent_id` names a record that does not exist
    DanglingParent { id: MemberId, parent_id: MemberId },
    /// `spouse_id` names a record that does not exist
    DanglingSpouse { id: MemberId, spouse_id: MemberId },
    /// `spouse_id` names the member itself
    SelfSpouse { id: MemberId },
    /// The named spouse does not point back
    OneDirectionalSpouse { id: MemberId, spouse_id: MemberId },
    /// Two children of the same parent are spouse-linked
    SiblingSpousePair {
        parent_id: MemberId,
        first: MemberId,
        second: MemberId,
    },
    /// Descending into `id` would revisit one of its own ancestors
    ParentCycle { id: MemberId, parent_id: MemberId },
    /// Descendants of `id` were cut off at the depth cap
    DepthLimitReached { id: MemberId, depth: u32 },
    /// Member is neither placed in the tree nor attached as a spouse
    Unreachable { id: MemberId },
}

impl DataQualityWarning {
    pub fn severity(&self) -> Severity {
        match self {
            DataQualityWarning::OneDirectionalSpouse { .. } => Severity::Info,
            DataQualityWarning::MultipleFounders { .. }
            | DataQualityWarning::DanglingParent { .. }
            | DataQualityWarning::DanglingSpouse { .. }
            | DataQualityWarning::SelfSpouse { .. }
            | DataQualityWarning::SiblingSpousePair { .. }
            | DataQualityWarning::Unreachable { .. } => Severity::Warn,
            DataQualityWarning::NoFounder
            | DataQualityWarning::ParentCycle { .. }
            | DataQualityWarning::DepthLimitReached { .. } => Severity::Error,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            DataQualityWarning::NoFounder => "no_founder",
            DataQualityWarning::MultipleFounders { .. } => "multiple_founders",
            DataQualityWarning::DanglingParent { .. } => "dangling_parent",
            DataQualityWarning::DanglingSpouse { .. } => "dangling_spouse",
            DataQualityWarning::SelfSpouse { .. } => "self_spouse",
            DataQualityWarning::OneDirectionalSpouse { .. } => "one_directional_spouse",
            DataQualityWarning::SiblingSpousePair { .. } => "sibling_spouse_pair",
            DataQualityWarning::ParentCycle { .. } => "parent_cycle",
            DataQualityWarning::DepthLimitReached { .. } => "depth_limit_reached",
            DataQualityWarning::Unreachable { .. } => "unreachable",
        }
    }

    /// Log through `tracing` at the matching level
    pub fn log(&self) {
        match self.severity() {
            Severity::Info => tracing::debug!(code = self.code(), "{}", self),
            Severity::Warn | Severity::Error => tracing::warn!(code = self.code(), "{}", self),
        }
    }
}

impl fmt::Display for DataQualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataQualityWarning::NoFounder => write!(f, "no generation-1 member found"),
            DataQualityWarning::MultipleFounders { ids } => {
                let ids: Vec<&str> = ids.iter().map(MemberId::as_str).collect();
                write!(f, "{} founders found: {}", ids.len(), ids.join(", "))
            }
            DataQualityWarning::DanglingParent { id, parent_id } => {
                write!(f, "member {} names missing parent {}", id, parent_id)
            }
            DataQualityWarning::DanglingSpouse { id, spouse_id } => {
                write!(f, "member {} names missing spouse {}", id, spouse_id)
            }
            DataQualityWarning::SelfSpouse { id } => {
                write!(f, "member {} is recorded as its own spouse", id)
            }
            DataQualityWarning::OneDirectionalSpouse { id, spouse_id } => {
                write!(f, "member {} names spouse {} which does not link back", id, spouse_id)
            }
            DataQualityWarning::SiblingSpousePair {
                parent_id,
                first,
                second,
            } => write!(
                f,
                "children {} and {} of {} are recorded as spouses; review manually",
                first, second, parent_id
            ),
            DataQualityWarning::ParentCycle { id, parent_id } => {
                write!(f, "parent cycle: {} is an ancestor of its parent {}", id, parent_id)
            }
            DataQualityWarning::DepthLimitReached { id, depth } => {
                write!(f, "descendants of {} cut off at depth {}", id, depth)
            }
            DataQualityWarning::Unreachable { id } => {
                write!(f, "member {} is not reachable from any founder", id)
            }
        }
    }
}

// =============================================================================
// AUDIT
// =============================================================================

/// Full audit with the default depth cap
pub fn audit(index: &RecordIndex) -> Vec<DataQualityWarning> {
    audit_with(index, &HierarchyConfig::default())
}

/// Record-level findings followed by the findings of a hierarchy build
pub fn audit_with(index: &RecordIndex, config: &HierarchyConfig) -> Vec<DataQualityWarning> {
    let mut warnings = record_warnings(index);
    match build_hierarchy(index, config) {
        Ok(tree) => warnings.extend(tree.warnings),
        Err(_) => {
            let warning = DataQualityWarning::NoFounder;
            warning.log();
            warnings.push(warning);
        }
    }
    warnings
}

/// Findings that need only the index: reference integrity and spouse symmetry
pub fn record_warnings(index: &RecordIndex) -> Vec<DataQualityWarning> {
    let resolver = MarriageResolver::new(index);
    let mut warnings = Vec::new();
    let mut reported_pairs: HashSet<(MemberId, MemberId)> = HashSet::new();

    for member in index.members() {
        if let Some(parent_id) = &member.parent_id {
            if !index.contains(parent_id.as_str()) {
                warnings.push(DataQualityWarning::DanglingParent {
                    id: member.id.clone(),
                    parent_id: parent_id.clone(),
                });
            }
        }

        if let Some(spouse_id) = &member.spouse_id {
            if spouse_id == &member.id {
                warnings.push(DataQualityWarning::SelfSpouse {
                    id: member.id.clone(),
                });
            } else {
                match index.get(spouse_id.as_str()) {
                    None => warnings.push(DataQualityWarning::DanglingSpouse {
                        id: member.id.clone(),
                        spouse_id: spouse_id.clone(),
                    }),
                    Some(spouse) if spouse.spouse_id.as_ref() != Some(&member.id) => {
                        warnings.push(DataQualityWarning::OneDirectionalSpouse {
                            id: member.id.clone(),
                            spouse_id: spouse_id.clone(),
                        })
                    }
                    Some(_) => {}
                }
            }
        }

        if resolver.is_sibling_pair(member) {
            if let (Some(partner), Some(parent_id)) =
                (resolver.partner_of(member), &member.parent_id)
            {
                let pair = ordered_pair(&member.id, &partner.id);
                if reported_pairs.insert(pair.clone()) {
                    warnings.push(DataQualityWarning::SiblingSpousePair {
                        parent_id: parent_id.clone(),
                        first: pair.0,
                        second: pair.1,
                    });
                }
            }
        }
    }

    for warning in &warnings {
        warning.log();
    }
    warnings
}

fn ordered_pair(a: &MemberId, b: &MemberId) -> (MemberId, MemberId) {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

// =============================================================================
// REVIEW REPORTS
// =============================================================================

/// One row of the "married with a recorded parent" review report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarriedWithParent {
    pub id: MemberId,
    pub name: String,
    pub generation: u32,
    /// Parent display name, `None` when the reference is dangling
    pub parent: Option<String>,
    /// Spouse display name, `None` when the reference is dangling
    pub spouse: Option<String>,
}

/// Members holding both a spouse and a parent reference.
///
/// A married-in member that still carries a parent reference hides itself
/// from the married-in rules, so this list is the starting point for manual
/// correction of such records.
pub fn married_with_parent(index: &RecordIndex) -> Vec<MarriedWithParent> {
    index
        .members()
        .iter()
        .filter(|m| m.spouse_id.is_some() && m.parent_id.is_some())
        .map(|member| MarriedWithParent {
            id: member.id.clone(),
            name: member.display_name(),
            generation: member.generation,
            parent: index.parent_of(member).map(Member::display_name),
            spouse: member
                .spouse_id
                .as_ref()
                .and_then(|id| index.get(id.as_str()))
                .map(Member::display_name),
        })
        .collect()
}
