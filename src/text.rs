//! Common text utilities: tokenizing, context windows, cleanup

use regex::Regex;
use std::sync::LazyLock;

/// Number of words kept on each side of a selected word
pub const CONTEXT_WORDS: usize = 5;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static CONTROL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x00-\x1F\x7F-\x9F]").unwrap());

pub fn truncate_display(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    }
}

/// Split text into word tokens, keeping punctuation attached to its word.
pub fn split_words(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Join the words surrounding `index`, `size` on each side, clipped to the
/// bounds of `words`. Out-of-range indices yield an empty string.
pub fn context_window(words: &[String], index: usize, size: usize) -> String {
    if index >= words.len() {
        return String::new();
    }
    let start = index.saturating_sub(size);
    let end = (index + size + 1).min(words.len());
    words[start..end].join(" ")
}

/// Normalize whitespace and typographic quotes, drop control characters.
pub fn clean_text(text: &str) -> String {
    let text = WHITESPACE.replace_all(text, " ");
    let text = text
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");
    CONTROL_CHARS.replace_all(&text, "").trim().to_string()
}

/// Rough script-based language guess.
pub fn detect_language(text: &str) -> &'static str {
    if text.chars().count() < 10 {
        return "unknown";
    }
    let in_range = |lo: u32, hi: u32| text.chars().any(|c| (lo..=hi).contains(&(c as u32)));

    if in_range(0x0400, 0x04FF) {
        "ru"
    } else if in_range(0x4E00, 0x9FFF) {
        "zh"
    } else if in_range(0x3040, 0x30FF) {
        "ja"
    } else {
        "en"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(s: &str) -> Vec<String> {
        split_words(s)
    }

    #[test]
    fn test_split_collapses_whitespace() {
        assert_eq!(words("  one\t two\n\nthree  "), vec!["one", "two", "three"]);
        assert!(words("   ").is_empty());
    }

    #[test]
    fn test_context_window_clips_to_bounds() {
        let w = words("a b c d e f g h i j k l m");
        assert_eq!(context_window(&w, 0, 5), "a b c d e f");
        assert_eq!(context_window(&w, 6, 5), "b c d e f g h i j k l");
        assert_eq!(context_window(&w, 12, 5), "h i j k l m");
        assert_eq!(context_window(&w, 13, 5), "");
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(
            clean_text("  \u{201C}Hi\u{201D}   it\u{2019}s\u{0007} me "),
            "\"Hi\" it's me"
        );
    }

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language("Привет, как дела?"), "ru");
        assert_eq!(detect_language("Hello there, friend"), "en");
        assert_eq!(detect_language("short"), "unknown");
    }
}
