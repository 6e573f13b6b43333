//! Identifier generation
//!
//! Collision-free short hashes and slugs for new variables. Hashes are six
//! uppercase alphanumeric characters drawn from a cryptographically secure
//! source; slugs are derived from display names and de-duplicated with a
//! numeric suffix.

use crate::db::StringStore;
use crate::services::StringServiceError;
use crate::utils::slugify;
use rand::Rng;

/// Length of a generated variable hash.
pub const HASH_LENGTH: usize = 6;

/// Alphabet for generated hashes: uppercase letters and digits.
pub const HASH_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Default number of draws before giving up on hash generation.
///
/// Collision probability is about 1/36^6 per draw against a free hash space,
/// so the budget only matters under pathological store contents.
pub const DEFAULT_HASH_RETRY_BUDGET: usize = 10_000;

fn draw_hash() -> String {
    // ThreadRng is a CSPRNG (ChaCha-based), matching the requirement for a
    // cryptographically secure source.
    let mut rng = rand::rng();
    (0..HASH_LENGTH)
        .map(|_| HASH_ALPHABET[rng.random_range(0..HASH_ALPHABET.len())] as char)
        .collect()
}

/// Generate a hash that is unused as a `variable_hash` in any project and
/// unused as a `variable_name` within the given project.
///
/// Retries up to `retry_budget` draws, then surfaces
/// [`StringServiceError::HashGenerationFailed`].
pub async fn unique_hash(
    store: &dyn StringStore,
    project_id: &str,
    retry_budget: usize,
) -> Result<String, StringServiceError> {
    for _ in 0..retry_budget {
        let candidate = draw_hash();
        if store.hash_exists(&candidate).await? {
            continue;
        }
        if store.name_exists(project_id, &candidate).await? {
            continue;
        }
        return Ok(candidate);
    }
    Err(StringServiceError::HashGenerationFailed {
        attempts: retry_budget,
    })
}

/// Slugify `base` and de-duplicate against the project's variable names by
/// appending `-1`, `-2`, ... until free.
///
/// Returns `None` when `base` slugifies to nothing (e.g. punctuation-only
/// display names); the variable then falls back to its hash.
pub async fn unique_slug(
    store: &dyn StringStore,
    project_id: &str,
    base: &str,
) -> Result<Option<String>, StringServiceError> {
    let base = slugify(base);
    if base.is_empty() {
        return Ok(None);
    }

    let mut candidate = base.clone();
    let mut suffix = 1;
    while store.name_exists(project_id, &candidate).await? {
        candidate = format!("{base}-{suffix}");
        suffix += 1;
    }
    Ok(Some(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_hash_shape() {
        for _ in 0..100 {
            let hash = draw_hash();
            assert_eq!(hash.len(), HASH_LENGTH);
            assert!(hash
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
        }
    }
}
