//! String Service - save/delete pipeline
//!
//! The main business entry points for string variables. Every top-level
//! write runs an explicit, ordered pipeline:
//!
//! 1. validate (hash format, duplicates, reference cycles)
//! 2. persist
//! 3. synchronize dimensions
//! 4. propagate renames into other strings' content
//! 5. inherit dimension tags from referenced variables
//!
//! Side effects run at most once per top-level write: a per-project
//! in-flight marker suppresses re-entrant triggering, replacing the hidden
//! global dispatch of signal-style designs with explicit ordering.

use crate::db::StringStore;
use crate::models::{StringDimensionValue, StringVariable, StringVariableUpdate};
use crate::services::dimension_sync::DimensionSynchronizer;
use crate::services::error::StringServiceError;
use crate::services::identifier;
use crate::services::in_flight::InFlightRegistry;
use crate::services::resolver::{self, DEFAULT_MAX_RESOLUTION_DEPTH};
use crate::utils::{reference_token, slugify};
use std::sync::Arc;
use tracing::{debug, info};

/// Tunables for the string service.
#[derive(Debug, Clone)]
pub struct StringServiceConfig {
    /// Hard bound on recursive resolution depth.
    pub max_resolution_depth: usize,
    /// Draws before hash generation gives up.
    pub hash_retry_budget: usize,
}

impl Default for StringServiceConfig {
    fn default() -> Self {
        Self {
            max_resolution_depth: DEFAULT_MAX_RESOLUTION_DEPTH,
            hash_retry_budget: identifier::DEFAULT_HASH_RETRY_BUDGET,
        }
    }
}

/// Parameters for creating a string variable.
#[derive(Debug, Clone)]
pub struct CreateStringParams {
    /// Owning project
    pub project_id: String,
    /// Raw content, may embed `{{name}}` references
    pub content: String,
    /// Optional display name; the variable name slug is derived from it
    pub display_name: Option<String>,
    /// Optional caller-supplied hash; validated, otherwise generated
    pub variable_hash: Option<String>,
    /// Whether this variable is a conditional container
    pub is_conditional_container: bool,
    /// Optional controlling spawn (composition of conditionals)
    pub controlled_by_spawn: Option<String>,
    /// Whether exposed in the cross-project registry
    pub is_published: bool,
}

impl CreateStringParams {
    /// Plain content-only params for the given project.
    pub fn content_only(project_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            content: content.into(),
            display_name: None,
            variable_hash: None,
            is_conditional_container: false,
            controlled_by_spawn: None,
            is_published: false,
        }
    }
}

/// Business service for string variables.
pub struct StringService {
    store: Arc<dyn StringStore>,
    synchronizer: DimensionSynchronizer,
    config: StringServiceConfig,
    in_flight: Arc<InFlightRegistry>,
}

impl StringService {
    /// Create a service with default configuration.
    pub fn new(store: Arc<dyn StringStore>) -> Self {
        Self::with_config(store, StringServiceConfig::default())
    }

    /// Create a service with explicit configuration.
    pub fn with_config(store: Arc<dyn StringStore>, config: StringServiceConfig) -> Self {
        Self {
            synchronizer: DimensionSynchronizer::new(Arc::clone(&store)),
            in_flight: Arc::new(InFlightRegistry::new()),
            store,
            config,
        }
    }

    /// Shared in-flight registry, for wiring up sibling services
    /// (e.g. [`crate::services::ProjectService`]) so their bulk writes
    /// suppress this service's side effects.
    pub fn in_flight_registry(&self) -> Arc<InFlightRegistry> {
        Arc::clone(&self.in_flight)
    }

    /// Get a string variable by id.
    pub async fn get_string_variable(&self, id: &str) -> Result<StringVariable, StringServiceError> {
        self.store
            .get_string(id)
            .await?
            .ok_or_else(|| StringServiceError::string_not_found(id))
    }

    /// List a project's string variables.
    pub async fn list_string_variables(
        &self,
        project_id: &str,
    ) -> Result<Vec<StringVariable>, StringServiceError> {
        self.require_project(project_id).await?;
        Ok(self.store.list_strings(project_id).await?)
    }

    /// List published strings across all projects (read-only registry).
    pub async fn list_published(&self) -> Result<Vec<StringVariable>, StringServiceError> {
        Ok(self.store.list_published_strings().await?)
    }

    /// Create a string variable and run the save pipeline.
    pub async fn create_string_variable(
        &self,
        params: CreateStringParams,
    ) -> Result<StringVariable, StringServiceError> {
        self.require_project(&params.project_id).await?;

        let variable_hash = match &params.variable_hash {
            Some(hash) => {
                StringVariable::validate_hash(hash)?;
                if let Some(other) = self
                    .store
                    .find_string_by_ref(&params.project_id, hash)
                    .await?
                {
                    return Err(hash_taken_error(hash, &other));
                }
                hash.clone()
            }
            None => {
                identifier::unique_hash(
                    self.store.as_ref(),
                    &params.project_id,
                    self.config.hash_retry_budget,
                )
                .await?
            }
        };

        resolver::validate_content(self.store.as_ref(), &params.project_id, &params.content, None)
            .await?;

        let mut string = StringVariable::new(&params.project_id, &params.content, &variable_hash);
        string.display_name = params.display_name.clone();
        string.is_conditional_container = params.is_conditional_container;
        string.controlled_by_spawn = params.controlled_by_spawn.clone();
        string.is_published = params.is_published;
        if let Some(display) = &params.display_name {
            string.variable_name =
                identifier::unique_slug(self.store.as_ref(), &params.project_id, display).await?;
        }

        let created = self.store.create_string(string).await?;
        info!(
            string = %created.id,
            name = created.effective_name(),
            "created string variable"
        );

        if let Some(_guard) = self.in_flight.begin(&created.project_id) {
            if created.is_conditional_container {
                self.synchronizer.sync_container(&created, None).await?;
            }
            resolver::inherit_dimension_tags(self.store.as_ref(), &created.id).await?;
        }

        self.get_string_variable(&created.id).await
    }

    /// Update a string variable and run the save pipeline, including rename
    /// propagation and dimension synchronization against the pre-save
    /// snapshot of the previous effective name.
    pub async fn update_string_variable(
        &self,
        id: &str,
        update: StringVariableUpdate,
    ) -> Result<StringVariable, StringServiceError> {
        let existing = self.get_string_variable(id).await?;
        let previous_name = existing.effective_name().to_string();
        let was_container = existing.is_conditional_container;

        if let Some(hash) = &update.variable_hash {
            if *hash != existing.variable_hash {
                StringVariable::validate_hash(hash)?;
                if let Some(other) = self
                    .store
                    .find_string_by_ref(&existing.project_id, hash)
                    .await?
                {
                    if other.id != existing.id {
                        return Err(hash_taken_error(hash, &other));
                    }
                }
            }
        }

        if let Some(content) = &update.content {
            resolver::validate_content(
                self.store.as_ref(),
                &existing.project_id,
                content,
                Some(&existing.id),
            )
            .await?;
        }

        let new_display = update.display_name.clone();
        self.store.update_string(id, update).await?;

        // Re-derive the variable name slug when the display name changed,
        // keeping the current name if it already matches the base slug.
        if let Some(display) = new_display {
            if existing.display_name.as_deref() != Some(display.as_str()) {
                let base = slugify(&display);
                let current = self.get_string_variable(id).await?;
                let keep =
                    !base.is_empty() && current.variable_name.as_deref() == Some(base.as_str());
                if !keep {
                    let slug = identifier::unique_slug(
                        self.store.as_ref(),
                        &existing.project_id,
                        &display,
                    )
                    .await?;
                    self.store.set_string_name(id, slug.as_deref()).await?;
                }
            }
        }

        let updated = self.get_string_variable(id).await?;

        if let Some(_guard) = self.in_flight.begin(&existing.project_id) {
            let new_name = updated.effective_name().to_string();
            if new_name != previous_name {
                self.propagate_rename(&existing.project_id, id, &previous_name, &new_name)
                    .await?;
                if !updated.is_conditional_container {
                    self.synchronizer
                        .rename_spawn_value(&updated, &previous_name)
                        .await?;
                }
            }

            if updated.is_conditional_container {
                self.synchronizer
                    .sync_container(&updated, Some(&previous_name))
                    .await?;
            } else if was_container {
                // Converted from container to plain string.
                self.synchronizer
                    .remove_container_dimension(&updated, Some(&previous_name))
                    .await?;
            }

            resolver::inherit_dimension_tags(self.store.as_ref(), id).await?;
        }

        self.get_string_variable(id).await
    }

    /// Delete a string variable: remove its dimension if it is a container,
    /// delete the record (cascading its tags), then clean up every
    /// dimension value in the project matching its effective name.
    pub async fn delete_string_variable(&self, id: &str) -> Result<(), StringServiceError> {
        let existing = self.get_string_variable(id).await?;
        let name = existing.effective_name().to_string();

        let guard = self.in_flight.begin(&existing.project_id);
        if guard.is_some() && existing.is_conditional_container {
            self.synchronizer
                .remove_container_dimension(&existing, None)
                .await?;
        }

        self.store.delete_string(id).await?;
        info!(string = %id, name = %name, "deleted string variable");

        if guard.is_some() {
            self.synchronizer
                .cleanup_values_for_name(&existing.project_id, &name)
                .await?;
        }
        Ok(())
    }

    /// Tag a string with a dimension value. Idempotent: assigning an
    /// existing tag is a no-op. Re-syncs the owning container's dimension
    /// since spawn membership may have changed.
    ///
    /// A value belonging to another project's dimension is treated as not
    /// found; tags never cross project boundaries.
    pub async fn assign_dimension_value(
        &self,
        string_id: &str,
        dimension_value_id: &str,
    ) -> Result<(), StringServiceError> {
        let string = self.get_string_variable(string_id).await?;
        let value = self
            .store
            .get_dimension_value(dimension_value_id)
            .await?
            .ok_or_else(|| StringServiceError::dimension_value_not_found(dimension_value_id))?;
        let dimension = self
            .store
            .get_dimension(&value.dimension_id)
            .await?
            .ok_or_else(|| StringServiceError::dimension_value_not_found(dimension_value_id))?;
        if dimension.project_id != string.project_id {
            return Err(StringServiceError::dimension_value_not_found(
                dimension_value_id,
            ));
        }

        match self
            .store
            .create_tag(StringDimensionValue::new(string_id, dimension_value_id))
            .await
        {
            Ok(_) => {}
            Err(e) if e.is_already_exists() => return Ok(()),
            Err(e) => return Err(e.into()),
        }

        if let Some(_guard) = self.in_flight.begin(&string.project_id) {
            self.synchronizer.resync_owning_container(&dimension).await?;
        }
        Ok(())
    }

    /// Remove a dimension value tag from a string and re-sync the owning
    /// container's dimension (the spawn may have dropped out).
    pub async fn remove_dimension_value(
        &self,
        string_id: &str,
        dimension_value_id: &str,
    ) -> Result<(), StringServiceError> {
        let string = self.get_string_variable(string_id).await?;
        let value = self.store.get_dimension_value(dimension_value_id).await?;

        self.store.delete_tag(string_id, dimension_value_id).await?;

        if let Some(_guard) = self.in_flight.begin(&string.project_id) {
            if let Some(value) = value {
                if let Some(dimension) = self.store.get_dimension(&value.dimension_id).await? {
                    self.synchronizer.resync_owning_container(&dimension).await?;
                }
            }
        }
        Ok(())
    }

    /// Resolve content against the project's variable set, flattening
    /// nested references. Unknown references stay literal.
    pub async fn resolve_content(
        &self,
        project_id: &str,
        content: &str,
    ) -> Result<String, StringServiceError> {
        self.require_project(project_id).await?;
        resolver::resolve_content(
            self.store.as_ref(),
            project_id,
            content,
            self.config.max_resolution_depth,
        )
        .await
    }

    /// Resolve a stored string's content by id.
    pub async fn resolve_string(&self, id: &str) -> Result<String, StringServiceError> {
        let string = self.get_string_variable(id).await?;
        resolver::resolve_content(
            self.store.as_ref(),
            &string.project_id,
            &string.content,
            self.config.max_resolution_depth,
        )
        .await
    }

    /// Validate content against reference cycles without persisting.
    pub async fn validate_content(
        &self,
        project_id: &str,
        content: &str,
        current_id: Option<&str>,
    ) -> Result<(), StringServiceError> {
        resolver::validate_content(self.store.as_ref(), project_id, content, current_id).await
    }

    /// Rewrite `{{old}}` to `{{new}}` in every other string of the project.
    ///
    /// Writes content directly through the store, bypassing the save
    /// pipeline so the rewrites cannot re-trigger synchronization. The token
    /// includes the delimiters, so `{{old}}` never matches inside a longer
    /// reference like `{{oldx}}`.
    async fn propagate_rename(
        &self,
        project_id: &str,
        changed_id: &str,
        old: &str,
        new: &str,
    ) -> Result<(), StringServiceError> {
        let old_token = reference_token(old);
        let new_token = reference_token(new);

        for string in self.store.list_strings(project_id).await? {
            if string.id == changed_id || !string.content.contains(&old_token) {
                continue;
            }
            let rewritten = string.content.replace(&old_token, &new_token);
            self.store.set_string_content(&string.id, &rewritten).await?;
            debug!(
                string = %string.id,
                old = old,
                new = new,
                "propagated variable rename into content"
            );
        }
        Ok(())
    }

    async fn require_project(&self, project_id: &str) -> Result<(), StringServiceError> {
        match self.store.get_project(project_id).await? {
            Some(_) => Ok(()),
            None => Err(StringServiceError::project_not_found(project_id)),
        }
    }
}

/// A caller-supplied hash colliding with another variable's name is a name
/// conflict, not a hash conflict; references would resolve to that variable.
fn hash_taken_error(hash: &str, other: &StringVariable) -> StringServiceError {
    if other.variable_name.as_deref() == Some(hash) {
        StringServiceError::duplicate_name(hash)
    } else {
        StringServiceError::duplicate_hash(hash)
    }
}
