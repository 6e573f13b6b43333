//! Project model
//!
//! A project is the scoping boundary for all other entities: variable names
//! are unique within a project, and dimensions belong to exactly one project.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Top-level container owning strings and dimensions.
///
/// Deleting a project cascades to every string, dimension, dimension value,
/// and tag it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique identifier (UUID v4)
    pub id: String,

    /// Human-readable project name
    pub name: String,

    /// Free-form description
    pub description: String,

    /// Owner identifier (opaque to the core; the host maps it to a user)
    pub owner: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a new project with a generated id and current timestamps.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: description.into(),
            owner: owner.into(),
            created_at: now,
            updated_at: now,
        }
    }
}
