//! Dimension Synchronization Tests
//!
//! Integration tests for the container/spawn dimension invariant: every
//! conditional container owns exactly one dimension named after its
//! effective name, whose values mirror the effective names of its tagged
//! spawns. Covers creation, tagging, spawn deletion, container rename
//! (in-place dimension rename), conversion back to a plain string, and
//! by-value cleanup.

#[cfg(test)]
mod dimension_sync_tests {
    use anyhow::Result;
    use std::sync::Arc;
    use strings_core::db::{MemoryStore, StringStore};
    use strings_core::models::{Dimension, DimensionValue, Project, StringVariable};
    use strings_core::services::{
        CreateStringParams, ProjectService, StringService, StringServiceError,
    };

    async fn setup() -> Result<(Arc<dyn StringStore>, StringService, Project)> {
        let store: Arc<dyn StringStore> = Arc::new(MemoryStore::new());
        let strings = StringService::new(store.clone());
        let projects = ProjectService::new(store.clone(), strings.in_flight_registry());
        let project = projects.create_project("Sync Project", "", "user-1").await?;
        Ok((store, strings, project))
    }

    async fn create_container(
        strings: &StringService,
        project_id: &str,
        display: &str,
    ) -> Result<StringVariable> {
        let mut params = CreateStringParams::content_only(project_id, "");
        params.display_name = Some(display.to_string());
        params.is_conditional_container = true;
        Ok(strings.create_string_variable(params).await?)
    }

    async fn create_spawn(
        strings: &StringService,
        project_id: &str,
        display: &str,
        content: &str,
    ) -> Result<StringVariable> {
        let mut params = CreateStringParams::content_only(project_id, content);
        params.display_name = Some(display.to_string());
        Ok(strings.create_string_variable(params).await?)
    }

    /// Create a value under the dimension and tag the spawn with it, the way
    /// an API layer would (value row first, then the tag assignment).
    async fn tag_spawn(
        store: &Arc<dyn StringStore>,
        strings: &StringService,
        dimension: &Dimension,
        spawn: &StringVariable,
    ) -> Result<DimensionValue> {
        let value = store
            .create_dimension_value(DimensionValue::new(&dimension.id, spawn.effective_name()))
            .await?;
        strings.assign_dimension_value(&spawn.id, &value.id).await?;
        Ok(value)
    }

    async fn value_texts(
        store: &Arc<dyn StringStore>,
        dimension_id: &str,
    ) -> Result<Vec<String>> {
        Ok(store
            .list_dimension_values(dimension_id)
            .await?
            .into_iter()
            .map(|v| v.value)
            .collect())
    }

    #[tokio::test]
    async fn test_container_save_creates_dimension() -> Result<()> {
        let (store, strings, project) = setup().await?;

        create_container(&strings, &project.id, "tone").await?;

        let dimension = store
            .find_dimension_by_name(&project.id, "tone")
            .await?
            .expect("dimension created for container");
        assert!(value_texts(&store, &dimension.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_spawn_tags_mirror_into_dimension_values() -> Result<()> {
        let (store, strings, project) = setup().await?;

        create_container(&strings, &project.id, "tone").await?;
        let dimension = store
            .find_dimension_by_name(&project.id, "tone")
            .await?
            .unwrap();

        let formal = create_spawn(&strings, &project.id, "formal", "Dear customer").await?;
        tag_spawn(&store, &strings, &dimension, &formal).await?;
        let casual = create_spawn(&strings, &project.id, "casual", "Hey there").await?;
        tag_spawn(&store, &strings, &dimension, &casual).await?;

        assert_eq!(
            value_texts(&store, &dimension.id).await?,
            vec!["casual", "formal"]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_deleting_spawn_removes_its_value() -> Result<()> {
        let (store, strings, project) = setup().await?;

        create_container(&strings, &project.id, "tone").await?;
        let dimension = store
            .find_dimension_by_name(&project.id, "tone")
            .await?
            .unwrap();
        let formal = create_spawn(&strings, &project.id, "formal", "Dear customer").await?;
        tag_spawn(&store, &strings, &dimension, &formal).await?;
        let casual = create_spawn(&strings, &project.id, "casual", "Hey there").await?;
        tag_spawn(&store, &strings, &dimension, &casual).await?;

        strings.delete_string_variable(&formal.id).await?;

        assert_eq!(value_texts(&store, &dimension.id).await?, vec!["casual"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_container_rename_renames_dimension_in_place() -> Result<()> {
        let (store, strings, project) = setup().await?;

        let container = create_container(&strings, &project.id, "tone").await?;
        let dimension = store
            .find_dimension_by_name(&project.id, "tone")
            .await?
            .unwrap();
        let formal = create_spawn(&strings, &project.id, "formal", "Dear customer").await?;
        let value = tag_spawn(&store, &strings, &dimension, &formal).await?;

        let update = strings_core::models::StringVariableUpdate {
            display_name: Some("voice".to_string()),
            ..Default::default()
        };
        strings.update_string_variable(&container.id, update).await?;

        // Same dimension row under the new name; values and tags intact.
        assert!(store
            .find_dimension_by_name(&project.id, "tone")
            .await?
            .is_none());
        let renamed = store
            .find_dimension_by_name(&project.id, "voice")
            .await?
            .expect("dimension renamed, not recreated");
        assert_eq!(renamed.id, dimension.id);
        assert_eq!(value_texts(&store, &renamed.id).await?, vec!["formal"]);
        assert_eq!(store.list_tags_for_string(&formal.id).await?.len(), 1);
        assert!(store.get_dimension_value(&value.id).await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_conversion_to_plain_string_deletes_dimension() -> Result<()> {
        let (store, strings, project) = setup().await?;

        let container = create_container(&strings, &project.id, "tone").await?;
        let dimension = store
            .find_dimension_by_name(&project.id, "tone")
            .await?
            .unwrap();
        let formal = create_spawn(&strings, &project.id, "formal", "Dear customer").await?;
        tag_spawn(&store, &strings, &dimension, &formal).await?;

        let update = strings_core::models::StringVariableUpdate {
            is_conditional_container: Some(false),
            ..Default::default()
        };
        strings.update_string_variable(&container.id, update).await?;

        assert!(store
            .find_dimension_by_name(&project.id, "tone")
            .await?
            .is_none());
        assert!(store.get_dimension(&dimension.id).await?.is_none());
        // Cascade took the value and its tag with it.
        assert!(store.list_tags_for_string(&formal.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_deleting_container_deletes_dimension() -> Result<()> {
        let (store, strings, project) = setup().await?;

        let container = create_container(&strings, &project.id, "tone").await?;
        let dimension = store
            .find_dimension_by_name(&project.id, "tone")
            .await?
            .unwrap();

        strings.delete_string_variable(&container.id).await?;

        assert!(store.get_dimension(&dimension.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_spawn_rename_rewrites_value_in_place() -> Result<()> {
        let (store, strings, project) = setup().await?;

        create_container(&strings, &project.id, "tone").await?;
        let dimension = store
            .find_dimension_by_name(&project.id, "tone")
            .await?
            .unwrap();
        let formal = create_spawn(&strings, &project.id, "formal", "Dear customer").await?;
        let value = tag_spawn(&store, &strings, &dimension, &formal).await?;
        let casual = create_spawn(&strings, &project.id, "casual", "Hey there").await?;
        tag_spawn(&store, &strings, &dimension, &casual).await?;

        let update = strings_core::models::StringVariableUpdate {
            display_name: Some("polite".to_string()),
            ..Default::default()
        };
        strings.update_string_variable(&formal.id, update).await?;

        assert_eq!(
            value_texts(&store, &dimension.id).await?,
            vec!["casual", "polite"]
        );
        // The value row was rewritten, not replaced, so the tag survives.
        let renamed = store.get_dimension_value(&value.id).await?.unwrap();
        assert_eq!(renamed.value, "polite");
        assert_eq!(store.list_tags_for_string(&formal.id).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_sync_is_idempotent() -> Result<()> {
        let (store, strings, project) = setup().await?;

        let container = create_container(&strings, &project.id, "tone").await?;
        let dimension = store
            .find_dimension_by_name(&project.id, "tone")
            .await?
            .unwrap();
        let formal = create_spawn(&strings, &project.id, "formal", "Dear customer").await?;
        let value = tag_spawn(&store, &strings, &dimension, &formal).await?;

        // Re-save the container twice with no changes.
        for _ in 0..2 {
            strings
                .update_string_variable(&container.id, Default::default())
                .await?;
        }

        assert_eq!(value_texts(&store, &dimension.id).await?, vec!["formal"]);
        assert!(store.get_dimension_value(&value.id).await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_sync_prunes_values_without_spawns() -> Result<()> {
        let (store, strings, project) = setup().await?;

        let container = create_container(&strings, &project.id, "tone").await?;
        let dimension = store
            .find_dimension_by_name(&project.id, "tone")
            .await?
            .unwrap();
        let formal = create_spawn(&strings, &project.id, "formal", "Dear customer").await?;
        tag_spawn(&store, &strings, &dimension, &formal).await?;

        // A value nothing is tagged with does not survive the next sync.
        store
            .create_dimension_value(DimensionValue::new(&dimension.id, "orphan"))
            .await?;
        strings
            .update_string_variable(&container.id, Default::default())
            .await?;

        assert_eq!(value_texts(&store, &dimension.id).await?, vec!["formal"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_untagging_spawn_removes_its_value() -> Result<()> {
        let (store, strings, project) = setup().await?;

        create_container(&strings, &project.id, "tone").await?;
        let dimension = store
            .find_dimension_by_name(&project.id, "tone")
            .await?
            .unwrap();
        let formal = create_spawn(&strings, &project.id, "formal", "Dear customer").await?;
        let value = tag_spawn(&store, &strings, &dimension, &formal).await?;
        let casual = create_spawn(&strings, &project.id, "casual", "Hey there").await?;
        tag_spawn(&store, &strings, &dimension, &casual).await?;

        strings.remove_dimension_value(&formal.id, &value.id).await?;

        assert_eq!(value_texts(&store, &dimension.id).await?, vec!["casual"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_assign_rejects_value_from_another_project() -> Result<()> {
        let (store, strings, project) = setup().await?;

        let other = store
            .create_project(Project::new("Other", "", "user-2"))
            .await?;
        create_container(&strings, &other.id, "tone").await?;
        let foreign_dimension = store
            .find_dimension_by_name(&other.id, "tone")
            .await?
            .unwrap();
        let foreign_value = store
            .create_dimension_value(DimensionValue::new(&foreign_dimension.id, "formal"))
            .await?;

        let spawn = create_spawn(&strings, &project.id, "formal", "Dear customer").await?;
        let err = strings
            .assign_dimension_value(&spawn.id, &foreign_value.id)
            .await
            .expect_err("cross-project tag must be rejected");
        assert!(matches!(
            err,
            StringServiceError::DimensionValueNotFound { .. }
        ));
        assert!(store.list_tags_for_string(&spawn.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_by_value_cleanup_spans_dimensions() -> Result<()> {
        let (store, strings, project) = setup().await?;

        create_container(&strings, &project.id, "tone").await?;
        create_container(&strings, &project.id, "audience").await?;
        let tone = store
            .find_dimension_by_name(&project.id, "tone")
            .await?
            .unwrap();
        let audience = store
            .find_dimension_by_name(&project.id, "audience")
            .await?
            .unwrap();

        // One spawn tagged into both dimensions under the same name.
        let shared = create_spawn(&strings, &project.id, "shared", "content").await?;
        tag_spawn(&store, &strings, &tone, &shared).await?;
        tag_spawn(&store, &strings, &audience, &shared).await?;
        assert_eq!(value_texts(&store, &tone.id).await?, vec!["shared"]);
        assert_eq!(value_texts(&store, &audience.id).await?, vec!["shared"]);

        strings.delete_string_variable(&shared.id).await?;

        assert!(value_texts(&store, &tone.id).await?.is_empty());
        assert!(value_texts(&store, &audience.id).await?.is_empty());
        Ok(())
    }
}
