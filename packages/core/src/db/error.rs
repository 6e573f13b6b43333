//! Storage Layer Error Types
//!
//! Errors surfaced by `StringStore` implementations. Service-layer code maps
//! these into its own taxonomy where a friendlier message is warranted.

use thiserror::Error;

/// Storage operation errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Record missing for a lookup that requires it
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Unique constraint violated
    #[error("unique constraint violated: {constraint}")]
    AlreadyExists { constraint: String },

    /// Conflicting concurrent write detected
    #[error("conflicting write: {context}")]
    Conflict { context: String },
}

impl StoreError {
    /// Create a not-found error
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Create a unique-constraint error
    pub fn already_exists(constraint: impl Into<String>) -> Self {
        Self::AlreadyExists {
            constraint: constraint.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict(context: impl Into<String>) -> Self {
        Self::Conflict {
            context: context.into(),
        }
    }

    /// Whether this error is a unique-constraint violation.
    ///
    /// The synchronizer treats these as "already exists, skip".
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}
