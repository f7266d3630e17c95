//! Domains that get a hand-written match condition instead of a url filter.
//!
//! A plain `facebook.com` url filter also matches any URL that merely
//! contains the text, so listed domains are matched by a regex anchored on
//! the scheme and host instead.

/// Match condition derived from a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchFilter {
    /// Wildcard filter in the host's url filter syntax
    Url(String),
    /// Regular expression over the full URL
    Regex(String),
}

/// A domain and the builder for its condition.
#[derive(Clone, Copy)]
pub struct SpecialCase {
    pub domain: &'static str,
    pub build: fn(&str) -> MatchFilter,
}

pub const SPECIAL_CASES: &[SpecialCase] = &[SpecialCase {
    domain: "facebook.com",
    build: host_regex,
}];

/// `^https?://(www\.)?<domain>/.*` with the domain escaped.
pub fn host_regex(domain: &str) -> MatchFilter {
    MatchFilter::Regex(format!("^https?://(www\\.)?{}/.*", escape_regex(domain)))
}

fn escape_regex(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 4);
    for c in text.chars() {
        if matches!(
            c,
            '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Find the special case a pattern selects, compared case-insensitively.
pub fn special_case_for(pattern: &str) -> Option<&'static SpecialCase> {
    let pattern = pattern.trim();
    SPECIAL_CASES
        .iter()
        .find(|case| case.domain.eq_ignore_ascii_case(pattern))
}

/// Condition for a pattern: the special case's if one applies, otherwise the
/// trimmed pattern itself as a url filter.
pub fn filter_for(pattern: &str) -> MatchFilter {
    let pattern = pattern.trim();
    match special_case_for(pattern) {
        Some(case) => (case.build)(case.domain),
        None => MatchFilter::Url(pattern.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facebook_uses_regex() {
        assert_eq!(
            filter_for("facebook.com"),
            MatchFilter::Regex(r"^https?://(www\.)?facebook\.com/.*".to_string())
        );
        assert_eq!(filter_for("FaceBook.COM"), filter_for("facebook.com"));
    }

    #[test]
    fn other_patterns_use_url_filter() {
        assert_eq!(filter_for("*.instagram.com"), MatchFilter::Url("*.instagram.com".to_string()));
        assert_eq!(filter_for("*.facebook.com"), MatchFilter::Url("*.facebook.com".to_string()));
        assert_eq!(filter_for("notfacebook.com"), MatchFilter::Url("notfacebook.com".to_string()));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(filter_for(" facebook.com "), filter_for("facebook.com"));
        assert_eq!(filter_for(" a.com\t"), MatchFilter::Url("a.com".to_string()));
    }

    #[test]
    fn escapes_regex_metacharacters() {
        assert_eq!(
            host_regex("a+b.example"),
            MatchFilter::Regex(r"^https?://(www\.)?a\+b\.example/.*".to_string())
        );
    }
}
