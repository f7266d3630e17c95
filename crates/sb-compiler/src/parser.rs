use sb_core::pattern::normalize_pattern;

/// Parse a plain-text pattern list: one pattern per line, blank lines and
/// lines starting with `#` or `!` ignored. Order is kept; duplicates are left
/// for the store to reject.
pub fn parse_pattern_list(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(normalize_pattern)
        .filter(|line| !is_comment_line(line))
        .collect()
}

fn is_comment_line(line: &str) -> bool {
    line.starts_with('#') || line.starts_with('!')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_comments_and_blanks() {
        let text = "# social\n*.instagram.com\n\n! old\n  facebook.com  \r\n*.instagram.com\n";
        assert_eq!(
            parse_pattern_list(text),
            vec!["*.instagram.com", "facebook.com", "*.instagram.com"]
        );
    }

    #[test]
    fn empty_text() {
        assert!(parse_pattern_list("").is_empty());
        assert!(parse_pattern_list("\n\n# nothing\n").is_empty());
    }
}
