//! Slugification for user-facing variable names
//!
//! Display names are normalized into slugs before being used as variable
//! names: ASCII-folded, lowercased, hyphen-joined, capped at 50 characters.

use crate::models::MAX_IDENTIFIER_LENGTH;

/// Best-effort ASCII fold for common Latin accented characters.
///
/// Anything outside the table that is not ASCII alphanumeric is treated as a
/// separator.
fn fold_char(c: char) -> Option<char> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'ß' => 's',
        _ if c.is_ascii_alphanumeric() => c.to_ascii_lowercase(),
        _ => return None,
    };
    Some(folded)
}

/// Normalize `input` into a slug: lowercase ASCII alphanumerics joined by
/// single hyphens, truncated to 50 characters without a trailing hyphen.
///
/// Returns an empty string when nothing slug-worthy remains, e.g. for
/// punctuation-only input; callers treat that as "no name".
///
/// # Examples
///
/// ```
/// use strings_core::utils::slugify;
///
/// assert_eq!(slugify("Welcome Message"), "welcome-message");
/// assert_eq!(slugify("Café Menu"), "cafe-menu");
/// assert_eq!(slugify("  !!  "), "");
/// ```
pub fn slugify(input: &str) -> String {
    let mut slug = String::new();
    let mut pending_separator = false;

    for c in input.chars().flat_map(|c| c.to_lowercase()) {
        match fold_char(c) {
            Some(folded) => {
                if pending_separator && !slug.is_empty() {
                    slug.push('-');
                }
                pending_separator = false;
                slug.push(folded);
            }
            None => pending_separator = true,
        }
    }

    slug.truncate(MAX_IDENTIFIER_LENGTH);
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_slug() {
        assert_eq!(slugify("Welcome Message"), "welcome-message");
    }

    #[test]
    fn test_accents_are_folded() {
        assert_eq!(slugify("Résumé für Müller"), "resume-fur-muller");
    }

    #[test]
    fn test_punctuation_collapses_to_single_hyphen() {
        assert_eq!(slugify("hello -- world!!"), "hello-world");
    }

    #[test]
    fn test_truncates_to_fifty_chars() {
        let long = "word ".repeat(20);
        let slug = slugify(&long);
        assert!(slug.len() <= 50);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn test_empty_when_nothing_remains() {
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify(""), "");
    }
}
