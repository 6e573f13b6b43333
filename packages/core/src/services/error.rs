//! Service Layer Error Types
//!
//! High-level error taxonomy for the string service pipeline. Validation
//! errors reject the write with no partial state change; not-found errors are
//! fatal for direct entity operations but non-fatal during resolution (an
//! unknown reference is left literally in the output).

use crate::db::StoreError;
use crate::models::ValidationError;
use thiserror::Error;

/// Errors produced by the Strings business services
#[derive(Error, Debug)]
pub enum StringServiceError {
    /// Saving this content would introduce a reference cycle
    #[error("circular reference detected involving variable \"{{{{{name}}}}}\"")]
    CircularReference { name: String },

    /// Content references the string being saved
    #[error("string cannot reference itself through variable \"{{{{{name}}}}}\"")]
    SelfReference { name: String },

    /// Variable name already taken within the project
    #[error("a variable named \"{name}\" already exists in this project")]
    DuplicateName { name: String },

    /// Variable hash already taken within the project
    #[error("a variable with hash \"{hash}\" already exists in this project")]
    DuplicateHash { hash: String },

    /// Caller-supplied field failed format validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// String not found by id
    #[error("string not found: {id}")]
    StringNotFound { id: String },

    /// Project not found by id
    #[error("project not found: {id}")]
    ProjectNotFound { id: String },

    /// Dimension value not found by id
    #[error("dimension value not found: {id}")]
    DimensionValueNotFound { id: String },

    /// Hash generator exhausted its retry budget without finding a free hash
    #[error("failed to generate a unique hash after {attempts} attempts")]
    HashGenerationFailed { attempts: usize },

    /// Recursive resolution exceeded the configured depth bound
    #[error("resolution exceeded maximum depth of {depth}")]
    ResolutionDepthExceeded { depth: usize },

    /// Storage operation failed
    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),
}

impl StringServiceError {
    /// Create a circular reference error
    pub fn circular_reference(name: impl Into<String>) -> Self {
        Self::CircularReference { name: name.into() }
    }

    /// Create a self reference error
    pub fn self_reference(name: impl Into<String>) -> Self {
        Self::SelfReference { name: name.into() }
    }

    /// Create a duplicate name error
    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::DuplicateName { name: name.into() }
    }

    /// Create a duplicate hash error
    pub fn duplicate_hash(hash: impl Into<String>) -> Self {
        Self::DuplicateHash { hash: hash.into() }
    }

    /// Create a string not found error
    pub fn string_not_found(id: impl Into<String>) -> Self {
        Self::StringNotFound { id: id.into() }
    }

    /// Create a project not found error
    pub fn project_not_found(id: impl Into<String>) -> Self {
        Self::ProjectNotFound { id: id.into() }
    }

    /// Create a dimension value not found error
    pub fn dimension_value_not_found(id: impl Into<String>) -> Self {
        Self::DimensionValueNotFound { id: id.into() }
    }
}
