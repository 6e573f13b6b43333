//! Variable reference extraction
//!
//! Content may embed `{{name}}` references to other variables. This module
//! extracts those references as plain names. There is no escaping support: a
//! literal `}}` inside a reference name is impossible to express.

use regex::Regex;
use std::sync::LazyLock;

/// Matches `{{name}}` where `name` is any run of characters not containing `}`.
static VARIABLE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^}]+)\}\}").expect("valid regex"));

/// Extract the ordered sequence of variable names referenced in `content`.
///
/// Duplicates are preserved; the caller decides whether to deduplicate.
/// Pure function over the input, safe to call repeatedly.
///
/// # Examples
///
/// ```
/// use strings_core::utils::extract_variable_refs;
///
/// let refs = extract_variable_refs("Hello {{name}}, meet {{name}} and {{other}}");
/// assert_eq!(refs, vec!["name", "name", "other"]);
/// ```
pub fn extract_variable_refs(content: &str) -> Vec<String> {
    VARIABLE_REF
        .captures_iter(content)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Render the literal reference token for a variable name: `{{name}}`.
///
/// Because the delimiters are part of the token, substring replacement of a
/// token is exact - `{{foo}}` never matches inside `{{foobar}}`.
pub fn reference_token(name: &str) -> String {
    format!("{{{{{name}}}}}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_reference() {
        assert_eq!(extract_variable_refs("Hello {{name}}"), vec!["name"]);
    }

    #[test]
    fn test_extract_preserves_order_and_duplicates() {
        let refs = extract_variable_refs("{{b}} then {{a}} then {{b}}");
        assert_eq!(refs, vec!["b", "a", "b"]);
    }

    #[test]
    fn test_extract_ignores_unbalanced_braces() {
        assert!(extract_variable_refs("no refs here").is_empty());
        assert!(extract_variable_refs("{{unclosed").is_empty());
        assert!(extract_variable_refs("{single}").is_empty());
    }

    #[test]
    fn test_extract_allows_arbitrary_name_characters() {
        let refs = extract_variable_refs("{{with spaces}} {{X1Y2Z3}} {{dash-ed}}");
        assert_eq!(refs, vec!["with spaces", "X1Y2Z3", "dash-ed"]);
    }

    #[test]
    fn test_reference_token_round_trip() {
        let token = reference_token("tone");
        assert_eq!(token, "{{tone}}");
        assert_eq!(extract_variable_refs(&token), vec!["tone"]);
    }

    #[test]
    fn test_token_is_bounded_by_delimiters() {
        // {{foo}} must not be found inside {{foobar}}
        assert!(!"{{foobar}}".contains(&reference_token("foo")));
    }
}
