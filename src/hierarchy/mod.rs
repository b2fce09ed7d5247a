//! Hierarchy resolution
//!
//! Builds the family forest from the record index, orders branch rosters and
//! reports data-quality findings.

pub mod branch;
pub mod builder;
pub mod diagnostics;

pub use branch::{group_by_branch, order_branch, BranchGroup};
pub use builder::{build_hierarchy, FamilyTree, HierarchyError, ResolvedNode};
pub use diagnostics::{
    audit, audit_with, married_with_parent, record_warnings, DataQualityWarning,
    MarriedWithParent, Severity,
};
