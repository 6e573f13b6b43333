//! StringStore Trait - Storage Abstraction Layer
//!
//! This module defines the `StringStore` trait that abstracts persistence for
//! projects, string variables, dimensions, dimension values, and tags. The
//! trait is the seam between business services (resolver, synchronizer,
//! rename propagation) and whatever database the host runs.
//!
//! # Design Decisions
//!
//! 1. **Async-first**: all methods are async so both embedded and networked
//!    backends fit behind the same trait object.
//! 2. **Ownership**: create methods take owned records; lookups return owned
//!    copies.
//! 3. **Uniqueness enforcement**: implementations must enforce the unique
//!    constraints documented per method and report violations as
//!    [`StoreError::AlreadyExists`].
//! 4. **Cascades**: deletes cascade as documented; deleting an absent record
//!    is a silent no-op (idempotent delete).
//!
//! # Concurrency
//!
//! The services use check-then-act patterns (find-or-create, check
//! uniqueness then write). Callers must serialize writes per project -
//! implementations backed by a real database should run these inside a
//! transaction at serializable-or-better isolation.

use crate::db::StoreError;
use crate::models::{
    Dimension, DimensionValue, Project, StringDimensionValue, StringVariable,
    StringVariableUpdate,
};
use async_trait::async_trait;

type Result<T> = std::result::Result<T, StoreError>;

/// Abstraction layer for Strings persistence operations.
///
/// Implementations must be `Send + Sync` so services can share them behind
/// `Arc<dyn StringStore>`.
#[async_trait]
pub trait StringStore: Send + Sync {
    //
    // PROJECTS
    //

    /// Create a project.
    async fn create_project(&self, project: Project) -> Result<Project>;

    /// Get a project by id. `Ok(None)` when absent.
    async fn get_project(&self, id: &str) -> Result<Option<Project>>;

    /// List all projects, ordered by creation time.
    async fn list_projects(&self) -> Result<Vec<Project>>;

    /// Delete a project, cascading to its strings, dimensions, values, and
    /// tags. No-op when absent.
    async fn delete_project(&self, id: &str) -> Result<()>;

    //
    // STRING VARIABLES
    //

    /// Create a string variable.
    ///
    /// # Errors
    ///
    /// `AlreadyExists` when `variable_name` or `variable_hash` is already
    /// taken within the project.
    async fn create_string(&self, string: StringVariable) -> Result<StringVariable>;

    /// Get a string variable by id. `Ok(None)` when absent.
    async fn get_string(&self, id: &str) -> Result<Option<StringVariable>>;

    /// Apply a sparse update and bump `updated_at`.
    ///
    /// # Errors
    ///
    /// `NotFound` when the string is absent; `AlreadyExists` on a
    /// uniqueness violation introduced by the update.
    async fn update_string(
        &self,
        id: &str,
        update: StringVariableUpdate,
    ) -> Result<StringVariable>;

    /// Overwrite a string's content directly, bypassing any service-level
    /// pipeline. Used by rename propagation.
    async fn set_string_content(&self, id: &str, content: &str) -> Result<()>;

    /// Set a string's `variable_name` (None clears it).
    ///
    /// # Errors
    ///
    /// `AlreadyExists` when the name is taken within the project.
    async fn set_string_name(&self, id: &str, name: Option<&str>) -> Result<()>;

    /// List a project's strings, ordered by creation time.
    async fn list_strings(&self, project_id: &str) -> Result<Vec<StringVariable>>;

    /// Find the project's string whose `variable_name` or `variable_hash`
    /// equals `name`. When both fields collide across rows the first match
    /// wins; the order is unspecified.
    async fn find_string_by_ref(
        &self,
        project_id: &str,
        name: &str,
    ) -> Result<Option<StringVariable>>;

    /// Whether `hash` is used as a `variable_hash` in any project.
    async fn hash_exists(&self, hash: &str) -> Result<bool>;

    /// Whether `name` is used as a `variable_name` within the project.
    async fn name_exists(&self, project_id: &str, name: &str) -> Result<bool>;

    /// Delete a string variable, cascading to its tags. No-op when absent.
    async fn delete_string(&self, id: &str) -> Result<()>;

    /// List published strings across all projects, ordered by creation time.
    async fn list_published_strings(&self) -> Result<Vec<StringVariable>>;

    //
    // DIMENSIONS
    //

    /// Create a dimension.
    ///
    /// # Errors
    ///
    /// `AlreadyExists` when the (project, name) pair is taken.
    async fn create_dimension(&self, dimension: Dimension) -> Result<Dimension>;

    /// Get a dimension by id. `Ok(None)` when absent.
    async fn get_dimension(&self, id: &str) -> Result<Option<Dimension>>;

    /// Find a project's dimension by name.
    async fn find_dimension_by_name(
        &self,
        project_id: &str,
        name: &str,
    ) -> Result<Option<Dimension>>;

    /// List a project's dimensions, ordered by creation time.
    async fn list_dimensions(&self, project_id: &str) -> Result<Vec<Dimension>>;

    /// Rename a dimension in place, preserving its values.
    ///
    /// # Errors
    ///
    /// `NotFound` when absent; `AlreadyExists` when the new name is taken
    /// within the project.
    async fn rename_dimension(&self, id: &str, new_name: &str) -> Result<Dimension>;

    /// Delete a dimension, cascading to its values and their tags. No-op
    /// when absent.
    async fn delete_dimension(&self, id: &str) -> Result<()>;

    //
    // DIMENSION VALUES
    //

    /// Create a dimension value.
    ///
    /// # Errors
    ///
    /// `AlreadyExists` when the (dimension, value) pair is taken.
    async fn create_dimension_value(&self, value: DimensionValue) -> Result<DimensionValue>;

    /// Get a dimension value by id. `Ok(None)` when absent.
    async fn get_dimension_value(&self, id: &str) -> Result<Option<DimensionValue>>;

    /// List a dimension's values, ordered by value text.
    async fn list_dimension_values(&self, dimension_id: &str) -> Result<Vec<DimensionValue>>;

    /// Find every dimension value in the project whose `value` equals
    /// `value`, across all dimensions. Used for by-value cleanup on string
    /// deletion.
    async fn find_dimension_values_by_value(
        &self,
        project_id: &str,
        value: &str,
    ) -> Result<Vec<DimensionValue>>;

    /// Rewrite a dimension value's text in place, preserving its tags.
    ///
    /// # Errors
    ///
    /// `NotFound` when absent; `AlreadyExists` when the new text is taken
    /// within the dimension.
    async fn set_dimension_value(&self, id: &str, value: &str) -> Result<DimensionValue>;

    /// Delete a dimension value, cascading to its tags. No-op when absent.
    async fn delete_dimension_value(&self, id: &str) -> Result<()>;

    //
    // STRING / DIMENSION VALUE TAGS
    //

    /// Create a tag assigning a dimension value to a string.
    ///
    /// # Errors
    ///
    /// `AlreadyExists` when the (string, dimension value) pair is taken.
    async fn create_tag(&self, tag: StringDimensionValue) -> Result<StringDimensionValue>;

    /// List the tags carried by a string.
    async fn list_tags_for_string(&self, string_id: &str) -> Result<Vec<StringDimensionValue>>;

    /// List the tags attached to any value of the given dimension.
    async fn list_tags_for_dimension(
        &self,
        dimension_id: &str,
    ) -> Result<Vec<StringDimensionValue>>;

    /// Delete the tag for a (string, dimension value) pair. No-op when
    /// absent.
    async fn delete_tag(&self, string_id: &str, dimension_value_id: &str) -> Result<()>;
}
