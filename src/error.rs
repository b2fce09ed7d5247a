//! Crate-level error type
//!
//! Each concern owns its own error enum; `ForestError` gathers them for callers
//! that drive the whole pipeline (the CLI, integration code).

use thiserror::Error;

use crate::config::ConfigError;
use crate::hierarchy::HierarchyError;
use crate::session::SessionError;

#[derive(Debug, Error)]
pub enum ForestError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("hierarchy error: {0}")]
    Hierarchy(#[from] HierarchyError),

    #[error("session error: {0}")]
    Session(#[from] SessionError),

    #[error("invalid record snapshot: {0}")]
    Records(#[from] serde_json::Error),
}

pub type ForestResult<T> = Result<T, ForestError>;

/// Parse a JSON array of member records as delivered by the store
pub fn parse_records(json: &str) -> ForestResult<Vec<family_types::Member>> {
    Ok(serde_json::from_str(json)?)
}
