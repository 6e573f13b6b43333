//! Dimension models
//!
//! A dimension is the name-space of choices for one conditional container
//! variable, keyed by `name == container.effective_name()`. Its values are
//! fully owned by the dimension synchronizer: after every relevant write the
//! value set equals exactly the effective names of the container's current
//! spawn variables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The set of named choices for one conditional container.
///
/// Unique per (project, name).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimension {
    /// Unique identifier (UUID v4)
    pub id: String,

    /// Owning project
    pub project_id: String,

    /// Matches the owning container's effective name
    pub name: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Dimension {
    /// Create a new dimension with a generated id and current timestamps.
    pub fn new(project_id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            project_id: project_id.into(),
            name: name.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// One labeled choice inside a dimension. Unique per (dimension, value).
///
/// Created when a new spawn is discovered during sync; deleted when its spawn
/// no longer maps to the dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionValue {
    /// Unique identifier (UUID v4)
    pub id: String,

    /// Owning dimension
    pub dimension_id: String,

    /// The choice label; mirrors a spawn variable's effective name
    pub value: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl DimensionValue {
    /// Create a new dimension value with a generated id and current timestamps.
    pub fn new(dimension_id: impl Into<String>, value: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            dimension_id: dimension_id.into(),
            value: value.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Tag assigning a dimension value to a string: "this string applies when
/// dimension X = value Y". Unique per (string, dimension value).
///
/// Either assigned manually or inherited automatically from referenced
/// variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringDimensionValue {
    /// Unique identifier (UUID v4)
    pub id: String,

    /// Tagged string
    pub string_id: String,

    /// Assigned dimension value
    pub dimension_value_id: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl StringDimensionValue {
    /// Create a new tag with a generated id and current timestamp.
    pub fn new(string_id: impl Into<String>, dimension_value_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            string_id: string_id.into(),
            dimension_value_id: dimension_value_id.into(),
            created_at: Utc::now(),
        }
    }
}
