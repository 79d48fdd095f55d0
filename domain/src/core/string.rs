//! String utilities for the domain layer.

/// Truncate a string to a maximum length with ellipsis (UTF-8 safe)
///
/// Uses byte length for max_len but ensures truncation occurs at valid
/// UTF-8 character boundaries.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let target = max_len.saturating_sub(3);
        let mut end = target.min(s.len());
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

/// Truncate a string to at most `max_chars` characters, ellipsis included
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

/// Collapse runs of whitespace (including newlines) into single spaces.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_multibyte() {
        // "é" is 2 bytes; max_len=6 -> target=3 -> back to boundary at 2
        assert_eq!(truncate("ééééé", 6), "é...");
        assert_eq!(truncate("café", 10), "café");
    }

    #[test]
    fn test_truncate_chars_counts_characters() {
        // 280 three-byte characters fit a 280-character budget
        let cjk = "漢".repeat(280);
        assert_eq!(truncate_chars(&cjk, 280), cjk);

        assert_eq!(truncate_chars("日本語のテキスト", 6), "日本語...");
        assert_eq!(truncate_chars("hello world", 8), "hello...");
        assert_eq!(truncate_chars("", 4), "");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a\n\n b\tc  "), "a b c");
        assert_eq!(collapse_whitespace(""), "");
    }
}
