//! URL/filename slugs.

/// Reduce a display name to a slug: lowercase ASCII alphanumerics with
/// single dashes, no leading or trailing dash.
///
/// Returns an empty string when the input has no alphanumeric characters;
/// callers decide the fallback.
///
/// ```
/// use craftline_core::slugify;
///
/// assert_eq!(slugify("Monthly Sales"), "monthly-sales");
/// assert_eq!(slugify("Q1 / 2026 -- Orders!"), "q1-2026-orders");
/// ```
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Handloom Sarees"), "handloom-sarees");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("Brass  &  Copper -- Decor"), "brass-copper-decor");
    }

    #[test]
    fn test_slugify_empty_when_no_alphanumerics() {
        assert_eq!(slugify("***"), "");
        assert_eq!(slugify(""), "");
    }
}
