//! Family Forest
//!
//! Resolves a flat snapshot of family member records into a forest of family
//! trees and drives a collapsible, incrementally laid out tree visualization.
//!
//! ## Layers
//!
//! - [`records`]: record index and married-in classification
//! - [`hierarchy`]: tree building, branch ordering and data-quality diagnostics
//! - [`layout`]: expansion state machine, bottom-up positioning, viewport fit
//!   and the cascading reveal scheduler
//! - [`session`]: the single entry point a renderer talks to
//! - [`events`]: per-pass notifications to subscribed renderers
//! - [`roster`]: flat list views (search, deceased, branch roster, ages)
//!
//! ## Example
//!
//! ```ignore
//! let mut session = FamilyTreeSession::new(ForestConfig::default());
//! let updates = session.subscribe(16);
//! session.rebuild(records);
//! session.request_cascade_expand()?;
//! while session.is_animating() {
//!     session.advance(frame_time);
//! }
//! for node in session.visible_nodes() {
//!     renderer.draw(node);
//! }
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod hierarchy;
pub mod layout;
pub mod records;
pub mod roster;
pub mod session;

pub use config::{ConfigError, ForestConfig};
pub use error::{parse_records, ForestError, ForestResult};
pub use events::{LayoutEvent, LayoutPass, LayoutReceiver};
pub use hierarchy::{build_hierarchy, DataQualityWarning, FamilyTree, HierarchyError, ResolvedNode};
pub use layout::{EdgeKind, ExpansionState, Orientation, TreeEdge, ViewportTransform, VisibleNode};
pub use records::{MarriageResolver, RecordIndex};
pub use session::{FamilyTreeSession, LayoutSnapshot, SessionError, TreeStatus};

pub use family_types::{BranchId, Member, MemberId, Registry};
