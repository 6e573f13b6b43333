//! Rename Propagation Tests
//!
//! Integration tests for content rewriting when a variable's effective name
//! changes: every other string's `{{old}}` tokens become `{{new}}`,
//! token-exact, with no partial matches inside longer references.

#[cfg(test)]
mod rename_propagation_tests {
    use anyhow::Result;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use strings_core::db::{MemoryStore, StringStore};
    use strings_core::models::{Project, StringVariable, StringVariableUpdate};
    use strings_core::services::{CreateStringParams, ProjectService, StringService};

    async fn setup() -> Result<(Arc<dyn StringStore>, StringService, Project)> {
        let store: Arc<dyn StringStore> = Arc::new(MemoryStore::new());
        let strings = StringService::new(store.clone());
        let projects = ProjectService::new(store.clone(), strings.in_flight_registry());
        let project = projects.create_project("Rename Project", "", "user-1").await?;
        Ok((store, strings, project))
    }

    async fn create_named(
        strings: &StringService,
        project_id: &str,
        display: &str,
        content: &str,
    ) -> Result<StringVariable> {
        let mut params = CreateStringParams::content_only(project_id, content);
        params.display_name = Some(display.to_string());
        Ok(strings.create_string_variable(params).await?)
    }

    #[tokio::test]
    async fn test_rename_rewrites_referencing_content() -> Result<()> {
        let (_store, strings, project) = setup().await?;

        let old = create_named(&strings, &project.id, "old", "value").await?;
        let greeting =
            create_named(&strings, &project.id, "greeting", "Hello {{old}}, bye {{old}}").await?;

        let update = StringVariableUpdate {
            display_name: Some("new".to_string()),
            ..Default::default()
        };
        strings.update_string_variable(&old.id, update).await?;

        let rewritten = strings.get_string_variable(&greeting.id).await?;
        assert_eq!(rewritten.content, "Hello {{new}}, bye {{new}}");
        assert_eq!(strings.resolve_string(&greeting.id).await?, "Hello value, bye value");
        Ok(())
    }

    #[tokio::test]
    async fn test_rename_is_token_exact() -> Result<()> {
        let (_store, strings, project) = setup().await?;

        let old = create_named(&strings, &project.id, "old", "value").await?;
        let other = create_named(
            &strings,
            &project.id,
            "other",
            "{{old}} {{oldx}} {{xold}} old",
        )
        .await?;

        let update = StringVariableUpdate {
            display_name: Some("new".to_string()),
            ..Default::default()
        };
        strings.update_string_variable(&old.id, update).await?;

        let rewritten = strings.get_string_variable(&other.id).await?;
        assert_eq!(rewritten.content, "{{new}} {{oldx}} {{xold}} old");
        Ok(())
    }

    #[tokio::test]
    async fn test_rename_skips_the_renamed_string_itself() -> Result<()> {
        let (_store, strings, project) = setup().await?;

        // Content mentioning the old name as plain text, not a reference.
        let old = create_named(&strings, &project.id, "old", "the old way").await?;

        let update = StringVariableUpdate {
            display_name: Some("new".to_string()),
            ..Default::default()
        };
        let updated = strings.update_string_variable(&old.id, update).await?;
        assert_eq!(updated.content, "the old way");
        Ok(())
    }

    #[tokio::test]
    async fn test_hash_change_propagates_for_unnamed_variable() -> Result<()> {
        let (_store, strings, project) = setup().await?;

        // No display name, so the hash is the effective name.
        let mut params = CreateStringParams::content_only(&project.id, "value");
        params.variable_hash = Some("AAA111".to_string());
        let var = strings.create_string_variable(params).await?;

        let greeting = create_named(&strings, &project.id, "greeting", "Hi {{AAA111}}").await?;

        let update = StringVariableUpdate {
            variable_hash: Some("BBB222".to_string()),
            ..Default::default()
        };
        strings.update_string_variable(&var.id, update).await?;

        let rewritten = strings.get_string_variable(&greeting.id).await?;
        assert_eq!(rewritten.content, "Hi {{BBB222}}");
        Ok(())
    }

    #[tokio::test]
    async fn test_unrelated_rename_leaves_content_alone() -> Result<()> {
        let (_store, strings, project) = setup().await?;

        let bystander = create_named(&strings, &project.id, "bystander", "{{other}}").await?;
        let old = create_named(&strings, &project.id, "old", "value").await?;

        let update = StringVariableUpdate {
            display_name: Some("new".to_string()),
            ..Default::default()
        };
        strings.update_string_variable(&old.id, update).await?;

        let unchanged = strings.get_string_variable(&bystander.id).await?;
        assert_eq!(unchanged.content, "{{other}}");
        Ok(())
    }
}
