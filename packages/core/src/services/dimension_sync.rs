//! Dimension synchronization
//!
//! Keeps the invariant that every conditional container variable has exactly
//! one dimension, named after the container's effective name, whose value set
//! mirrors the effective names of the container's current spawn variables.
//!
//! Spawn membership is tag-based: a string is a spawn of a container's
//! dimension iff it carries a tag whose dimension value belongs to that
//! dimension. Cleanup on deletion is by-value rather than by-relation so a
//! deleted variable's name is removed from every dimension it appears in,
//! including stale values left by earlier renames.
//!
//! All operations are idempotent: re-running a sync on a dimension already in
//! the correct state is a no-op, and a uniqueness conflict during value
//! creation is treated as "already exists, skip". A missing row during
//! cleanup is logged and skipped, never letting one bad row block the rest.

use crate::db::{StoreError, StringStore};
use crate::models::{Dimension, DimensionValue, StringVariable};
use crate::services::StringServiceError;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Maintains container dimensions against the evolving spawn set.
pub struct DimensionSynchronizer {
    store: Arc<dyn StringStore>,
}

impl DimensionSynchronizer {
    /// Create a synchronizer over the given store.
    pub fn new(store: Arc<dyn StringStore>) -> Self {
        Self { store }
    }

    /// Sync a conditional container after a save.
    ///
    /// Gets or creates the dimension named after the container's effective
    /// name. When the container was renamed (`previous_name` differs), the
    /// existing dimension is renamed in place to preserve its values and
    /// tags; if the old dimension cannot be found this falls back to
    /// get-or-create under the new name. Finally reconciles the value set.
    pub async fn sync_container(
        &self,
        container: &StringVariable,
        previous_name: Option<&str>,
    ) -> Result<(), StringServiceError> {
        let name = container.effective_name();

        let dimension = match previous_name.filter(|prev| *prev != name) {
            Some(prev) => {
                match self
                    .store
                    .find_dimension_by_name(&container.project_id, prev)
                    .await?
                {
                    Some(existing) => {
                        match self.store.rename_dimension(&existing.id, name).await {
                            Ok(renamed) => {
                                info!(
                                    dimension = %renamed.id,
                                    old = prev,
                                    new = name,
                                    "renamed container dimension in place"
                                );
                                renamed
                            }
                            Err(e) if e.is_already_exists() => {
                                // A dimension under the new name already
                                // exists; adopt it and leave the old one to
                                // by-value cleanup.
                                warn!(
                                    old = prev,
                                    new = name,
                                    "dimension rename collided; adopting existing dimension"
                                );
                                self.get_or_create_dimension(&container.project_id, name)
                                    .await?
                            }
                            Err(e) => return Err(e.into()),
                        }
                    }
                    None => {
                        self.get_or_create_dimension(&container.project_id, name)
                            .await?
                    }
                }
            }
            None => {
                self.get_or_create_dimension(&container.project_id, name)
                    .await?
            }
        };

        self.reconcile(container, &dimension).await
    }

    /// Delete the container's dimension on conversion to a plain string or
    /// on container deletion, cascading to its values and tags.
    ///
    /// The dimension is looked up under the container's current effective
    /// name, falling back to `previous_name` when the delete accompanies a
    /// rename.
    pub async fn remove_container_dimension(
        &self,
        container: &StringVariable,
        previous_name: Option<&str>,
    ) -> Result<(), StringServiceError> {
        let mut dimension = self
            .store
            .find_dimension_by_name(&container.project_id, container.effective_name())
            .await?;
        if dimension.is_none() {
            if let Some(prev) = previous_name {
                dimension = self
                    .store
                    .find_dimension_by_name(&container.project_id, prev)
                    .await?;
            }
        }

        match dimension {
            Some(dimension) => {
                info!(
                    dimension = %dimension.id,
                    name = %dimension.name,
                    "removing container dimension"
                );
                self.store.delete_dimension(&dimension.id).await?;
            }
            None => {
                debug!(
                    container = %container.id,
                    "no dimension to remove for container"
                );
            }
        }
        Ok(())
    }

    /// By-value cleanup after a string deletion: delete every dimension
    /// value in the project whose text equals the deleted variable's
    /// effective name, then re-sync each affected dimension's owning
    /// container.
    pub async fn cleanup_values_for_name(
        &self,
        project_id: &str,
        name: &str,
    ) -> Result<(), StringServiceError> {
        let stale = self
            .store
            .find_dimension_values_by_value(project_id, name)
            .await?;
        if stale.is_empty() {
            return Ok(());
        }

        let mut affected: BTreeSet<String> = BTreeSet::new();
        for value in stale {
            debug!(value = %value.value, dimension = %value.dimension_id, "deleting stale dimension value");
            self.store.delete_dimension_value(&value.id).await?;
            affected.insert(value.dimension_id);
        }

        for dimension_id in affected {
            let Some(dimension) = self.store.get_dimension(&dimension_id).await? else {
                warn!(dimension = %dimension_id, "dimension vanished during cleanup; skipping");
                continue;
            };
            self.resync_owning_container(&dimension).await?;
        }
        Ok(())
    }

    /// In-place rename of the dimension values tagged onto a renamed spawn.
    ///
    /// For each tag the string carries whose value text equals `old_name`,
    /// rewrite the value to the string's new effective name (preserving the
    /// tag links) and re-sync the owning container's dimension.
    pub async fn rename_spawn_value(
        &self,
        string: &StringVariable,
        old_name: &str,
    ) -> Result<(), StringServiceError> {
        let new_name = string.effective_name();
        for tag in self.store.list_tags_for_string(&string.id).await? {
            let Some(value) = self
                .store
                .get_dimension_value(&tag.dimension_value_id)
                .await?
            else {
                warn!(
                    tag = %tag.id,
                    "dimension value mapping not found during sync; skipping"
                );
                continue;
            };
            if value.value != old_name {
                continue;
            }

            match self.store.set_dimension_value(&value.id, new_name).await {
                Ok(_) => {
                    info!(
                        value = %value.id,
                        old = old_name,
                        new = new_name,
                        "renamed spawn dimension value in place"
                    );
                }
                Err(e) if e.is_already_exists() => {
                    warn!(
                        old = old_name,
                        new = new_name,
                        "spawn value rename collided with existing value; skipping"
                    );
                    continue;
                }
                Err(e) => return Err(e.into()),
            }

            let Some(dimension) = self.store.get_dimension(&value.dimension_id).await? else {
                warn!(dimension = %value.dimension_id, "owning dimension not found; skipping re-sync");
                continue;
            };
            self.resync_owning_container(&dimension).await?;
        }
        Ok(())
    }

    /// Find the container owning `dimension` (by effective name) and re-run
    /// a full sync for it. Dimensions without an owning container are left
    /// untouched.
    pub(crate) async fn resync_owning_container(
        &self,
        dimension: &Dimension,
    ) -> Result<(), StringServiceError> {
        let strings = self.store.list_strings(&dimension.project_id).await?;
        let container = strings
            .into_iter()
            .find(|s| s.is_conditional_container && s.effective_name() == dimension.name);
        match container {
            Some(container) => self.sync_container(&container, None).await,
            None => {
                debug!(
                    dimension = %dimension.id,
                    name = %dimension.name,
                    "no owning container for dimension; skipping re-sync"
                );
                Ok(())
            }
        }
    }

    async fn get_or_create_dimension(
        &self,
        project_id: &str,
        name: &str,
    ) -> Result<Dimension, StringServiceError> {
        if let Some(existing) = self.store.find_dimension_by_name(project_id, name).await? {
            return Ok(existing);
        }
        match self
            .store
            .create_dimension(Dimension::new(project_id, name))
            .await
        {
            Ok(created) => {
                info!(dimension = %created.id, name, "created container dimension");
                Ok(created)
            }
            Err(e) if e.is_already_exists() => {
                // Lost a create race; the winner's row is the one we want.
                self.store
                    .find_dimension_by_name(project_id, name)
                    .await?
                    .ok_or_else(|| StoreError::not_found("dimension", name).into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Reconcile the dimension's value set to equal exactly the effective
    /// names of the container's current spawns.
    ///
    /// Spawns are discovered through tags: every non-container string in the
    /// project carrying a tag on one of this dimension's values. Spawn names
    /// are iterated in sorted order for stable creation order.
    async fn reconcile(
        &self,
        container: &StringVariable,
        dimension: &Dimension,
    ) -> Result<(), StringServiceError> {
        let strings = self.store.list_strings(&container.project_id).await?;
        let by_id: HashMap<&str, &StringVariable> =
            strings.iter().map(|s| (s.id.as_str(), s)).collect();

        let mut spawn_names: BTreeSet<String> = BTreeSet::new();
        for tag in self.store.list_tags_for_dimension(&dimension.id).await? {
            let Some(string) = by_id.get(tag.string_id.as_str()) else {
                warn!(
                    tag = %tag.id,
                    "dimension value mapping not found during sync; skipping"
                );
                continue;
            };
            if string.is_conditional_container || string.id == container.id {
                continue;
            }
            spawn_names.insert(string.effective_name().to_string());
        }

        let current = self.store.list_dimension_values(&dimension.id).await?;

        for name in &spawn_names {
            if current.iter().any(|v| &v.value == name) {
                continue;
            }
            match self
                .store
                .create_dimension_value(DimensionValue::new(&dimension.id, name))
                .await
            {
                Ok(_) => {
                    debug!(dimension = %dimension.id, value = %name, "created dimension value for spawn");
                }
                Err(e) if e.is_already_exists() => {}
                Err(e) => return Err(e.into()),
            }
        }

        for value in current {
            if !spawn_names.contains(&value.value) {
                debug!(
                    dimension = %dimension.id,
                    value = %value.value,
                    "deleting dimension value with no corresponding spawn"
                );
                self.store.delete_dimension_value(&value.id).await?;
            }
        }
        Ok(())
    }
}
