//! Pattern helpers used by the UI surfaces.
//!
//! Real URL matching is done by the browser against installed rules. The
//! check here is the coarse one the popup uses to decide whether the tab it
//! is looking at should be sent to the blocked page right away.

use crate::url::extract_host;

/// Normalize user input into a pattern. Returns None for blank input.
pub fn normalize_pattern(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Pattern that blocks every page on the host of `url`.
///
/// `https://news.example.com/a?b` becomes `*://news.example.com/*`.
pub fn pattern_for_url(url: &str) -> Option<String> {
    let host = extract_host(url)?;
    Some(format!("*://{}/*", host.to_ascii_lowercase()))
}

/// Literal part of a pattern: a leading `*://` and every `*` removed.
fn literal_part(pattern: &str) -> String {
    let rest = pattern.strip_prefix("*://").unwrap_or(pattern);
    rest.replace('*', "")
}

/// Coarse check whether `url` falls under any of `patterns`.
pub fn is_url_blocked<S: AsRef<str>>(url: &str, patterns: &[S]) -> bool {
    patterns.iter().any(|pattern| {
        let literal = literal_part(pattern.as_ref());
        !literal.is_empty() && url.contains(&literal)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_input() {
        assert_eq!(normalize_pattern("  *.example.com \n"), Some("*.example.com".to_string()));
        assert_eq!(normalize_pattern("   "), None);
        assert_eq!(normalize_pattern(""), None);
    }

    #[test]
    fn builds_current_site_pattern() {
        assert_eq!(
            pattern_for_url("https://News.Example.com/story?id=1"),
            Some("*://news.example.com/*".to_string())
        );
        assert_eq!(pattern_for_url("http://localhost:3000/"), Some("*://localhost/*".to_string()));
        assert_eq!(pattern_for_url("about:blank"), None);
    }

    #[test]
    fn coarse_check_strips_wildcards() {
        let patterns = ["*.instagram.com", "*://news.example.com/*"];

        assert!(is_url_blocked("https://www.instagram.com/explore", &patterns));
        assert!(is_url_blocked("https://news.example.com/", &patterns));
        assert!(!is_url_blocked("https://example.com/", &patterns));
    }

    #[test]
    fn bare_wildcards_do_not_block_everything() {
        assert!(!is_url_blocked("https://example.com/", &["*", "*://*"]));
        assert!(!is_url_blocked::<&str>("https://example.com/", &[]));
    }
}
