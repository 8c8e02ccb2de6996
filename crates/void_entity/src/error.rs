//! Error types for entity bookkeeping

use thiserror::Error;

/// Entity errors
#[derive(Debug, Error)]
pub enum EntityError {
    /// No anchor with this id
    #[error("Anchor not found: {0}")]
    AnchorNotFound(String),

    /// An anchor with this id already exists
    #[error("Duplicate anchor: {0}")]
    DuplicateAnchor(String),

    /// The origin anchor can never be disabled
    #[error("The origin anchor cannot be disabled")]
    OriginAnchorDisabled,
}

/// Result type for entity operations
pub type Result<T> = std::result::Result<T, EntityError>;
