//! Record layer
//!
//! Fast lookups over the flat member snapshot and the married-in
//! classification built on top of them.

pub mod index;
pub mod marriage;

pub use index::{RecordIndex, SpouseLinks};
pub use marriage::{MarriageResolver, MarriedInReason};
