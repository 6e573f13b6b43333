//! In-memory StringStore implementation
//!
//! Reference backend used by the test suite and by embeddable hosts that do
//! not need durable storage. All state lives behind a single `RwLock`, which
//! also provides the per-project write serialization the check-then-act
//! patterns in the services rely on.
//!
//! Uniqueness constraints are enforced through secondary indexes on
//! (project, variable_name) and (project, variable_hash), plus a global
//! usage count per hash backing [`StringStore::hash_exists`].

use crate::db::{StoreError, StringStore};
use crate::models::{
    Dimension, DimensionValue, Project, StringDimensionValue, StringVariable,
    StringVariableUpdate,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

type Result<T> = std::result::Result<T, StoreError>;

#[derive(Default)]
struct Inner {
    projects: BTreeMap<String, Project>,
    strings: BTreeMap<String, StringVariable>,
    dimensions: BTreeMap<String, Dimension>,
    values: BTreeMap<String, DimensionValue>,
    tags: BTreeMap<String, StringDimensionValue>,

    /// (project_id, variable_name) -> string id
    name_index: HashMap<(String, String), String>,
    /// (project_id, variable_hash) -> string id
    hash_index: HashMap<(String, String), String>,
    /// variable_hash -> usage count across all projects
    hash_usage: HashMap<String, usize>,
}

impl Inner {
    fn index_string(&mut self, string: &StringVariable) {
        if let Some(name) = &string.variable_name {
            self.name_index
                .insert((string.project_id.clone(), name.clone()), string.id.clone());
        }
        self.hash_index.insert(
            (string.project_id.clone(), string.variable_hash.clone()),
            string.id.clone(),
        );
        *self.hash_usage.entry(string.variable_hash.clone()).or_insert(0) += 1;
    }

    fn unindex_string(&mut self, string: &StringVariable) {
        if let Some(name) = &string.variable_name {
            self.name_index
                .remove(&(string.project_id.clone(), name.clone()));
        }
        self.hash_index
            .remove(&(string.project_id.clone(), string.variable_hash.clone()));
        if let Some(count) = self.hash_usage.get_mut(&string.variable_hash) {
            *count -= 1;
            if *count == 0 {
                self.hash_usage.remove(&string.variable_hash);
            }
        }
    }

    /// Remove a string and cascade to its tags.
    fn remove_string(&mut self, id: &str) {
        if let Some(string) = self.strings.remove(id) {
            self.unindex_string(&string);
            self.tags.retain(|_, tag| tag.string_id != id);
        }
    }

    /// Remove a dimension value and cascade to its tags.
    fn remove_value(&mut self, id: &str) {
        if self.values.remove(id).is_some() {
            self.tags.retain(|_, tag| tag.dimension_value_id != id);
        }
    }

    /// Remove a dimension and cascade to its values and their tags.
    fn remove_dimension(&mut self, id: &str) {
        if self.dimensions.remove(id).is_some() {
            let value_ids: Vec<String> = self
                .values
                .values()
                .filter(|v| v.dimension_id == id)
                .map(|v| v.id.clone())
                .collect();
            for value_id in value_ids {
                self.remove_value(&value_id);
            }
        }
    }

    fn dimension_value_ids(&self, dimension_id: &str) -> Vec<String> {
        self.values
            .values()
            .filter(|v| v.dimension_id == dimension_id)
            .map(|v| v.id.clone())
            .collect()
    }
}

/// In-process `StringStore` backed by maps behind a single `RwLock`.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        // Lock poisoning only happens after a panic in another thread; at
        // that point continuing with the data is no worse than aborting.
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn by_creation<T, F>(mut records: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> (chrono::DateTime<Utc>, String),
{
    records.sort_by_key(|r| key(r));
    records
}

#[async_trait]
impl StringStore for MemoryStore {
    //
    // PROJECTS
    //

    async fn create_project(&self, project: Project) -> Result<Project> {
        let mut inner = self.write();
        if inner.projects.contains_key(&project.id) {
            return Err(StoreError::already_exists("project id"));
        }
        inner.projects.insert(project.id.clone(), project.clone());
        Ok(project)
    }

    async fn get_project(&self, id: &str) -> Result<Option<Project>> {
        Ok(self.read().projects.get(id).cloned())
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        let projects: Vec<Project> = self.read().projects.values().cloned().collect();
        Ok(by_creation(projects, |p| (p.created_at, p.id.clone())))
    }

    async fn delete_project(&self, id: &str) -> Result<()> {
        let mut inner = self.write();
        if inner.projects.remove(id).is_none() {
            return Ok(());
        }
        let string_ids: Vec<String> = inner
            .strings
            .values()
            .filter(|s| s.project_id == id)
            .map(|s| s.id.clone())
            .collect();
        for string_id in string_ids {
            inner.remove_string(&string_id);
        }
        let dimension_ids: Vec<String> = inner
            .dimensions
            .values()
            .filter(|d| d.project_id == id)
            .map(|d| d.id.clone())
            .collect();
        for dimension_id in dimension_ids {
            inner.remove_dimension(&dimension_id);
        }
        Ok(())
    }

    //
    // STRING VARIABLES
    //

    async fn create_string(&self, string: StringVariable) -> Result<StringVariable> {
        let mut inner = self.write();
        if let Some(name) = &string.variable_name {
            if inner
                .name_index
                .contains_key(&(string.project_id.clone(), name.clone()))
            {
                return Err(StoreError::already_exists(format!(
                    "variable_name \"{name}\" in project"
                )));
            }
        }
        if inner
            .hash_index
            .contains_key(&(string.project_id.clone(), string.variable_hash.clone()))
        {
            return Err(StoreError::already_exists(format!(
                "variable_hash \"{}\" in project",
                string.variable_hash
            )));
        }
        inner.index_string(&string);
        inner.strings.insert(string.id.clone(), string.clone());
        Ok(string)
    }

    async fn get_string(&self, id: &str) -> Result<Option<StringVariable>> {
        Ok(self.read().strings.get(id).cloned())
    }

    async fn update_string(
        &self,
        id: &str,
        update: StringVariableUpdate,
    ) -> Result<StringVariable> {
        let mut inner = self.write();
        let Some(existing) = inner.strings.get(id).cloned() else {
            return Err(StoreError::not_found("string", id));
        };

        let mut updated = existing.clone();
        if let Some(content) = update.content {
            updated.content = content;
        }
        if let Some(hash) = update.variable_hash {
            updated.variable_hash = hash;
        }
        if let Some(display_name) = update.display_name {
            updated.display_name = Some(display_name);
        }
        if let Some(container) = update.is_conditional_container {
            updated.is_conditional_container = container;
        }
        if let Some(spawn) = update.controlled_by_spawn {
            updated.controlled_by_spawn = spawn;
        }
        if let Some(published) = update.is_published {
            updated.is_published = published;
        }
        updated.updated_at = Utc::now();

        if updated.variable_hash != existing.variable_hash {
            let key = (updated.project_id.clone(), updated.variable_hash.clone());
            if inner.hash_index.get(&key).is_some_and(|owner| owner != id) {
                return Err(StoreError::already_exists(format!(
                    "variable_hash \"{}\" in project",
                    updated.variable_hash
                )));
            }
        }

        inner.unindex_string(&existing);
        inner.index_string(&updated);
        inner.strings.insert(id.to_string(), updated.clone());
        Ok(updated)
    }

    async fn set_string_content(&self, id: &str, content: &str) -> Result<()> {
        let mut inner = self.write();
        let Some(string) = inner.strings.get_mut(id) else {
            return Err(StoreError::not_found("string", id));
        };
        string.content = content.to_string();
        string.updated_at = Utc::now();
        Ok(())
    }

    async fn set_string_name(&self, id: &str, name: Option<&str>) -> Result<()> {
        let mut inner = self.write();
        let Some(existing) = inner.strings.get(id).cloned() else {
            return Err(StoreError::not_found("string", id));
        };
        if let Some(name) = name {
            let key = (existing.project_id.clone(), name.to_string());
            if inner.name_index.get(&key).is_some_and(|owner| owner != id) {
                return Err(StoreError::already_exists(format!(
                    "variable_name \"{name}\" in project"
                )));
            }
        }

        let mut updated = existing.clone();
        updated.variable_name = name.map(str::to_string);
        updated.updated_at = Utc::now();

        inner.unindex_string(&existing);
        inner.index_string(&updated);
        inner.strings.insert(id.to_string(), updated);
        Ok(())
    }

    async fn list_strings(&self, project_id: &str) -> Result<Vec<StringVariable>> {
        let strings: Vec<StringVariable> = self
            .read()
            .strings
            .values()
            .filter(|s| s.project_id == project_id)
            .cloned()
            .collect();
        Ok(by_creation(strings, |s| (s.created_at, s.id.clone())))
    }

    async fn find_string_by_ref(
        &self,
        project_id: &str,
        name: &str,
    ) -> Result<Option<StringVariable>> {
        let inner = self.read();
        let key = (project_id.to_string(), name.to_string());
        let id = inner
            .name_index
            .get(&key)
            .or_else(|| inner.hash_index.get(&key));
        Ok(id.and_then(|id| inner.strings.get(id)).cloned())
    }

    async fn hash_exists(&self, hash: &str) -> Result<bool> {
        Ok(self.read().hash_usage.contains_key(hash))
    }

    async fn name_exists(&self, project_id: &str, name: &str) -> Result<bool> {
        Ok(self
            .read()
            .name_index
            .contains_key(&(project_id.to_string(), name.to_string())))
    }

    async fn delete_string(&self, id: &str) -> Result<()> {
        self.write().remove_string(id);
        Ok(())
    }

    async fn list_published_strings(&self) -> Result<Vec<StringVariable>> {
        let strings: Vec<StringVariable> = self
            .read()
            .strings
            .values()
            .filter(|s| s.is_published)
            .cloned()
            .collect();
        Ok(by_creation(strings, |s| (s.created_at, s.id.clone())))
    }

    //
    // DIMENSIONS
    //

    async fn create_dimension(&self, dimension: Dimension) -> Result<Dimension> {
        let mut inner = self.write();
        let taken = inner
            .dimensions
            .values()
            .any(|d| d.project_id == dimension.project_id && d.name == dimension.name);
        if taken {
            return Err(StoreError::already_exists(format!(
                "dimension \"{}\" in project",
                dimension.name
            )));
        }
        inner
            .dimensions
            .insert(dimension.id.clone(), dimension.clone());
        Ok(dimension)
    }

    async fn get_dimension(&self, id: &str) -> Result<Option<Dimension>> {
        Ok(self.read().dimensions.get(id).cloned())
    }

    async fn find_dimension_by_name(
        &self,
        project_id: &str,
        name: &str,
    ) -> Result<Option<Dimension>> {
        Ok(self
            .read()
            .dimensions
            .values()
            .find(|d| d.project_id == project_id && d.name == name)
            .cloned())
    }

    async fn list_dimensions(&self, project_id: &str) -> Result<Vec<Dimension>> {
        let dimensions: Vec<Dimension> = self
            .read()
            .dimensions
            .values()
            .filter(|d| d.project_id == project_id)
            .cloned()
            .collect();
        Ok(by_creation(dimensions, |d| (d.created_at, d.id.clone())))
    }

    async fn rename_dimension(&self, id: &str, new_name: &str) -> Result<Dimension> {
        let mut inner = self.write();
        let Some(existing) = inner.dimensions.get(id).cloned() else {
            return Err(StoreError::not_found("dimension", id));
        };
        let taken = inner
            .dimensions
            .values()
            .any(|d| d.id != id && d.project_id == existing.project_id && d.name == new_name);
        if taken {
            return Err(StoreError::already_exists(format!(
                "dimension \"{new_name}\" in project"
            )));
        }
        let mut updated = existing;
        updated.name = new_name.to_string();
        updated.updated_at = Utc::now();
        inner.dimensions.insert(id.to_string(), updated.clone());
        Ok(updated)
    }

    async fn delete_dimension(&self, id: &str) -> Result<()> {
        self.write().remove_dimension(id);
        Ok(())
    }

    //
    // DIMENSION VALUES
    //

    async fn create_dimension_value(&self, value: DimensionValue) -> Result<DimensionValue> {
        let mut inner = self.write();
        let taken = inner
            .values
            .values()
            .any(|v| v.dimension_id == value.dimension_id && v.value == value.value);
        if taken {
            return Err(StoreError::already_exists(format!(
                "dimension value \"{}\"",
                value.value
            )));
        }
        inner.values.insert(value.id.clone(), value.clone());
        Ok(value)
    }

    async fn get_dimension_value(&self, id: &str) -> Result<Option<DimensionValue>> {
        Ok(self.read().values.get(id).cloned())
    }

    async fn list_dimension_values(&self, dimension_id: &str) -> Result<Vec<DimensionValue>> {
        let mut values: Vec<DimensionValue> = self
            .read()
            .values
            .values()
            .filter(|v| v.dimension_id == dimension_id)
            .cloned()
            .collect();
        values.sort_by(|a, b| a.value.cmp(&b.value));
        Ok(values)
    }

    async fn find_dimension_values_by_value(
        &self,
        project_id: &str,
        value: &str,
    ) -> Result<Vec<DimensionValue>> {
        let inner = self.read();
        let mut found: Vec<DimensionValue> = inner
            .values
            .values()
            .filter(|v| {
                v.value == value
                    && inner
                        .dimensions
                        .get(&v.dimension_id)
                        .is_some_and(|d| d.project_id == project_id)
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(found)
    }

    async fn set_dimension_value(&self, id: &str, value: &str) -> Result<DimensionValue> {
        let mut inner = self.write();
        let Some(existing) = inner.values.get(id).cloned() else {
            return Err(StoreError::not_found("dimension value", id));
        };
        let taken = inner
            .values
            .values()
            .any(|v| v.id != id && v.dimension_id == existing.dimension_id && v.value == value);
        if taken {
            return Err(StoreError::already_exists(format!(
                "dimension value \"{value}\""
            )));
        }
        let mut updated = existing;
        updated.value = value.to_string();
        updated.updated_at = Utc::now();
        inner.values.insert(id.to_string(), updated.clone());
        Ok(updated)
    }

    async fn delete_dimension_value(&self, id: &str) -> Result<()> {
        self.write().remove_value(id);
        Ok(())
    }

    //
    // TAGS
    //

    async fn create_tag(&self, tag: StringDimensionValue) -> Result<StringDimensionValue> {
        let mut inner = self.write();
        let taken = inner.tags.values().any(|t| {
            t.string_id == tag.string_id && t.dimension_value_id == tag.dimension_value_id
        });
        if taken {
            return Err(StoreError::already_exists(
                "tag for (string, dimension value) pair",
            ));
        }
        inner.tags.insert(tag.id.clone(), tag.clone());
        Ok(tag)
    }

    async fn list_tags_for_string(&self, string_id: &str) -> Result<Vec<StringDimensionValue>> {
        let tags: Vec<StringDimensionValue> = self
            .read()
            .tags
            .values()
            .filter(|t| t.string_id == string_id)
            .cloned()
            .collect();
        Ok(by_creation(tags, |t| (t.created_at, t.id.clone())))
    }

    async fn list_tags_for_dimension(
        &self,
        dimension_id: &str,
    ) -> Result<Vec<StringDimensionValue>> {
        let inner = self.read();
        let value_ids = inner.dimension_value_ids(dimension_id);
        let mut tags: Vec<StringDimensionValue> = inner
            .tags
            .values()
            .filter(|t| value_ids.iter().any(|id| *id == t.dimension_value_id))
            .cloned()
            .collect();
        tags.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        Ok(tags)
    }

    async fn delete_tag(&self, string_id: &str, dimension_value_id: &str) -> Result<()> {
        self.write().tags.retain(|_, t| {
            !(t.string_id == string_id && t.dimension_value_id == dimension_value_id)
        });
        Ok(())
    }
}
