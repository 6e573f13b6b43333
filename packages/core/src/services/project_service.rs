//! Project Service - project CRUD and duplication
//!
//! Thin project operations plus full-project duplication: a copy of the
//! project with all its dimensions, values, strings, and tag links. The
//! copy's rows are written directly through the store with the project's
//! in-flight marker held, so the bulk writes cannot trigger dimension
//! synchronization or rename propagation mid-copy.

use crate::db::{StringStore, StoreError};
use crate::models::{Dimension, DimensionValue, Project, StringDimensionValue, StringVariable};
use crate::services::error::StringServiceError;
use crate::services::identifier;
use crate::services::in_flight::InFlightRegistry;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Business service for projects.
pub struct ProjectService {
    store: Arc<dyn StringStore>,
    in_flight: Arc<InFlightRegistry>,
}

impl ProjectService {
    /// Create a service sharing the string service's in-flight registry
    /// (see [`crate::services::StringService::in_flight_registry`]).
    pub fn new(store: Arc<dyn StringStore>, in_flight: Arc<InFlightRegistry>) -> Self {
        Self { store, in_flight }
    }

    /// Create a project.
    pub async fn create_project(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        owner: impl Into<String>,
    ) -> Result<Project, StringServiceError> {
        Ok(self
            .store
            .create_project(Project::new(name, description, owner))
            .await?)
    }

    /// Get a project by id.
    pub async fn get_project(&self, id: &str) -> Result<Project, StringServiceError> {
        self.store
            .get_project(id)
            .await?
            .ok_or_else(|| StringServiceError::project_not_found(id))
    }

    /// List all projects.
    pub async fn list_projects(&self) -> Result<Vec<Project>, StringServiceError> {
        Ok(self.store.list_projects().await?)
    }

    /// Delete a project and everything it owns.
    pub async fn delete_project(&self, id: &str) -> Result<(), StringServiceError> {
        self.get_project(id).await?;
        Ok(self.store.delete_project(id).await?)
    }

    /// Duplicate a project with all its strings, dimensions, and
    /// relationships, under the name "Copy of <original>".
    ///
    /// `variable_hash` values are preserved so identifiers stay familiar;
    /// a conflicting hash is regenerated instead. Tag links whose dimension
    /// value cannot be mapped are logged and skipped rather than failing
    /// the whole copy.
    pub async fn duplicate_project(&self, id: &str) -> Result<Project, StringServiceError> {
        let original = self.get_project(id).await?;
        info!(project = %original.id, name = %original.name, "duplicating project");

        let copy = self
            .store
            .create_project(Project::new(
                format!("Copy of {}", original.name),
                &original.description,
                &original.owner,
            ))
            .await?;

        // Hold the marker so nothing re-enters the save pipeline for the
        // copy while its rows are being written in bulk.
        let _guard = self.in_flight.begin(&copy.id);

        // old dimension value id -> new dimension value id
        let mut value_map: HashMap<String, String> = HashMap::new();

        for dimension in self.store.list_dimensions(&original.id).await? {
            let new_dimension = self
                .store
                .create_dimension(Dimension::new(&copy.id, &dimension.name))
                .await?;
            let values = self.store.list_dimension_values(&dimension.id).await?;
            debug!(
                dimension = %dimension.name,
                values = values.len(),
                "duplicated dimension"
            );
            for value in values {
                let new_value = self
                    .store
                    .create_dimension_value(DimensionValue::new(&new_dimension.id, &value.value))
                    .await?;
                value_map.insert(value.id, new_value.id);
            }
        }

        for string in self.store.list_strings(&original.id).await? {
            let created = self.duplicate_string(&copy.id, &string).await?;

            for tag in self.store.list_tags_for_string(&string.id).await? {
                let Some(new_value_id) = value_map.get(&tag.dimension_value_id) else {
                    warn!(
                        string = %string.id,
                        dimension_value = %tag.dimension_value_id,
                        "no mapping for dimension value; skipping tag"
                    );
                    continue;
                };
                match self
                    .store
                    .create_tag(StringDimensionValue::new(&created.id, new_value_id))
                    .await
                {
                    Ok(_) => {}
                    Err(e) if e.is_already_exists() => {}
                    Err(e) => {
                        warn!(
                            string = %string.id,
                            error = %e,
                            "failed to duplicate tag; skipping"
                        );
                    }
                }
            }
        }

        info!(project = %copy.id, "duplication completed");
        self.get_project(&copy.id).await
    }

    async fn duplicate_string(
        &self,
        project_id: &str,
        original: &StringVariable,
    ) -> Result<StringVariable, StringServiceError> {
        let mut clone = StringVariable::new(project_id, &original.content, &original.variable_hash);
        clone.variable_name = original.variable_name.clone();
        clone.display_name = original.display_name.clone();
        clone.is_conditional_container = original.is_conditional_container;
        clone.is_published = original.is_published;

        match self.store.create_string(clone).await {
            Ok(created) => Ok(created),
            Err(StoreError::AlreadyExists { constraint }) => {
                // Hash conflict in the copy; regenerate instead of failing.
                warn!(
                    hash = %original.variable_hash,
                    constraint = %constraint,
                    "identifier conflict during duplication; generating new hash"
                );
                let hash = identifier::unique_hash(
                    self.store.as_ref(),
                    project_id,
                    identifier::DEFAULT_HASH_RETRY_BUDGET,
                )
                .await?;
                let mut retry = StringVariable::new(project_id, &original.content, hash);
                retry.variable_name = original.variable_name.clone();
                retry.display_name = original.display_name.clone();
                retry.is_conditional_container = original.is_conditional_container;
                retry.is_published = original.is_published;
                Ok(self.store.create_string(retry).await?)
            }
            Err(e) => Err(e.into()),
        }
    }
}
