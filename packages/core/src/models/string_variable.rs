//! StringVariable model
//!
//! The central content-bearing entity. A string variable's content may embed
//! `{{name}}` references to other variables in the same project, which the
//! resolver flattens on read.
//!
//! # Naming
//!
//! Every string variable carries an always-present `variable_hash` (6-char
//! uppercase alphanumeric, generated) and an optional `variable_name`
//! (slug derived from `display_name`, unique within the project). The
//! *effective name* - `variable_name` if set, else `variable_hash` - is what
//! `{{...}}` references are matched against.
//!
//! # Conditional containers
//!
//! A variable with `is_conditional_container = true` acts as a named switch:
//! its choices are the "spawn" variables tagged into its dimension. The
//! dimension synchronizer keeps the dimension's value set mirroring the
//! spawns' effective names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use thiserror::Error;
use uuid::Uuid;

/// Maximum length of a caller-supplied variable hash or derived slug.
pub const MAX_IDENTIFIER_LENGTH: usize = 50;

static HASH_FORMAT: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^[A-Za-z0-9][A-Za-z0-9\-]*$").expect("valid regex"));

/// Validation errors for string variable fields
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("hash must start with a letter or number and contain only letters, numbers, and hyphens: {0}")]
    InvalidHashFormat(String),

    #[error("hash must be {MAX_IDENTIFIER_LENGTH} characters or less: {0}")]
    HashTooLong(String),
}

/// A named, content-bearing unit scoped to one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringVariable {
    /// Unique identifier (UUID v4)
    pub id: String,

    /// Owning project
    pub project_id: String,

    /// Raw text, may embed `{{name}}` references
    pub content: String,

    /// Optional user-facing identifier, unique within the project.
    /// Derived from `display_name` by slugification.
    pub variable_name: Option<String>,

    /// Always-present fallback identifier, unique within the project.
    /// Generated as 6 uppercase alphanumeric characters.
    pub variable_hash: String,

    /// User-entered display name the slug is derived from
    pub display_name: Option<String>,

    /// Marks this variable as a conditional container (a named switch whose
    /// value is chosen from a set of mutually exclusive spawn variables)
    pub is_conditional_container: bool,

    /// When the referenced spawn is selected, this variable is shown too
    /// (composition of conditionals). Non-owning relation.
    pub controlled_by_spawn: Option<String>,

    /// Whether exposed in the read-only cross-project registry
    pub is_published: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl StringVariable {
    /// Create a new string variable with a generated id and current timestamps.
    ///
    /// The caller provides the `variable_hash`; use
    /// [`crate::services::identifier::unique_hash`] to generate one.
    pub fn new(
        project_id: impl Into<String>,
        content: impl Into<String>,
        variable_hash: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            project_id: project_id.into(),
            content: content.into(),
            variable_name: None,
            variable_hash: variable_hash.into(),
            display_name: None,
            is_conditional_container: false,
            controlled_by_spawn: None,
            is_published: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// The identifier `{{...}}` references are matched against:
    /// `variable_name` if set, else `variable_hash`.
    pub fn effective_name(&self) -> &str {
        self.variable_name.as_deref().unwrap_or(&self.variable_hash)
    }

    /// Validate a caller-supplied hash: must start with a letter or digit,
    /// contain only letters, digits, and hyphens, and fit the length limit.
    pub fn validate_hash(hash: &str) -> Result<(), ValidationError> {
        if hash.len() > MAX_IDENTIFIER_LENGTH {
            return Err(ValidationError::HashTooLong(hash.to_string()));
        }
        if !HASH_FORMAT.is_match(hash) {
            return Err(ValidationError::InvalidHashFormat(hash.to_string()));
        }
        Ok(())
    }
}

/// Sparse update for a string variable - only provided fields change.
///
/// `controlled_by_spawn` is doubly optional so callers can distinguish
/// "leave unchanged" (`None`) from "clear the relation" (`Some(None)`).
#[derive(Debug, Clone, Default)]
pub struct StringVariableUpdate {
    pub content: Option<String>,
    pub variable_hash: Option<String>,
    pub display_name: Option<String>,
    pub is_conditional_container: Option<bool>,
    pub controlled_by_spawn: Option<Option<String>>,
    pub is_published: Option<bool>,
}
