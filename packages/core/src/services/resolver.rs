//! Variable resolution
//!
//! Flattens `{{name}}` references into final text, validates content against
//! reference cycles on write, and propagates dimension tags from referenced
//! variables to their referrers.
//!
//! Reference lookup matches a project's string whose `variable_name` or
//! `variable_hash` equals the referenced name. When both fields collide
//! across rows the first match wins; the order is unspecified.

use crate::db::StringStore;
use crate::models::StringDimensionValue;
use crate::services::StringServiceError;
use crate::utils::{extract_variable_refs, reference_token};
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use tracing::debug;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Default bound on recursive resolution depth.
///
/// Validation rejects cycles on write, but the bound converts any cycle
/// that slips through (e.g. written by another store client) into a hard
/// error instead of unbounded recursion.
pub const DEFAULT_MAX_RESOLUTION_DEPTH: usize = 64;

/// Resolve every `{{name}}` reference in `content` recursively, substituting
/// the referenced variable's flattened content. Unknown references are left
/// literally in the output.
///
/// # Errors
///
/// [`StringServiceError::ResolutionDepthExceeded`] when nesting exceeds
/// `max_depth`.
pub async fn resolve_content(
    store: &dyn StringStore,
    project_id: &str,
    content: &str,
    max_depth: usize,
) -> Result<String, StringServiceError> {
    resolve_inner(store, project_id.to_string(), content.to_string(), 0, max_depth).await
}

fn resolve_inner(
    store: &dyn StringStore,
    project_id: String,
    content: String,
    depth: usize,
    max_depth: usize,
) -> BoxFuture<'_, Result<String, StringServiceError>> {
    Box::pin(async move {
        if depth > max_depth {
            return Err(StringServiceError::ResolutionDepthExceeded { depth: max_depth });
        }

        let mut output = content;
        for name in extract_variable_refs(&output) {
            let Some(variable) = store.find_string_by_ref(&project_id, &name).await? else {
                continue;
            };
            let replacement = resolve_inner(
                store,
                project_id.clone(),
                variable.content,
                depth + 1,
                max_depth,
            )
            .await?;
            output = output.replace(&reference_token(&name), &replacement);
        }
        Ok(output)
    })
}

/// Validate `content` against reference cycles before a write.
///
/// Walks referenced variables recursively with a visited set keyed by
/// variable id. Reports [`StringServiceError::SelfReference`] when the
/// string being saved is referenced directly at any level, and
/// [`StringServiceError::CircularReference`] when any cycle is reached.
/// Unknown references are ignored.
pub async fn validate_content(
    store: &dyn StringStore,
    project_id: &str,
    content: &str,
    current_id: Option<&str>,
) -> Result<(), StringServiceError> {
    validate_inner(
        store,
        project_id.to_string(),
        content.to_string(),
        current_id.map(str::to_string),
        HashSet::new(),
    )
    .await
}

fn validate_inner(
    store: &dyn StringStore,
    project_id: String,
    content: String,
    current_id: Option<String>,
    visited: HashSet<String>,
) -> BoxFuture<'_, Result<(), StringServiceError>> {
    Box::pin(async move {
        for name in extract_variable_refs(&content) {
            let Some(variable) = store.find_string_by_ref(&project_id, &name).await? else {
                continue;
            };
            // Only effective-name matches participate in the walk; a stale
            // hash reference to a renamed variable resolves but is not a
            // cycle through that variable's identity.
            if variable.effective_name() != name {
                continue;
            }
            if current_id.as_deref() == Some(variable.id.as_str()) {
                return Err(StringServiceError::self_reference(name));
            }
            if visited.contains(&variable.id) {
                return Err(StringServiceError::circular_reference(name));
            }

            let mut branch = visited.clone();
            if let Some(id) = &current_id {
                branch.insert(id.clone());
            }
            branch.insert(variable.id.clone());
            validate_inner(
                store,
                project_id.clone(),
                variable.content.clone(),
                Some(variable.id.clone()),
                branch,
            )
            .await?;
        }
        Ok(())
    })
}

/// Union the dimension value tags of every referenced variable into the
/// given string's tag set, depth-first so referenced variables inherit their
/// own references' tags first.
///
/// Additive only: tags a caller explicitly set are never removed, and
/// already-present tags are skipped.
pub async fn inherit_dimension_tags(
    store: &dyn StringStore,
    string_id: &str,
) -> Result<(), StringServiceError> {
    let mut visited = HashSet::new();
    inherit_inner(store, string_id.to_string(), &mut visited).await
}

fn inherit_inner<'a>(
    store: &'a dyn StringStore,
    string_id: String,
    visited: &'a mut HashSet<String>,
) -> BoxFuture<'a, Result<(), StringServiceError>> {
    Box::pin(async move {
        if !visited.insert(string_id.clone()) {
            return Ok(());
        }
        let Some(string) = store.get_string(&string_id).await? else {
            return Ok(());
        };

        for name in extract_variable_refs(&string.content) {
            let Some(referenced) = store.find_string_by_ref(&string.project_id, &name).await?
            else {
                continue;
            };
            inherit_inner(store, referenced.id.clone(), &mut *visited).await?;

            for tag in store.list_tags_for_string(&referenced.id).await? {
                let inherited = StringDimensionValue::new(&string_id, &tag.dimension_value_id);
                match store.create_tag(inherited).await {
                    Ok(_) => {
                        debug!(
                            string_id = %string_id,
                            dimension_value_id = %tag.dimension_value_id,
                            "inherited dimension tag from referenced variable"
                        );
                    }
                    Err(e) if e.is_already_exists() => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }
        Ok(())
    })
}
