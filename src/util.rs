//! Shared text helpers for the analysis crate.

use std::sync::LazyLock;

use regex::Regex;

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)```(?:json)?\s*").expect("code fence pattern is valid")
});

/// Remove Markdown code-fence markers and trim the result.
///
/// Every ```` ```json ```` or ```` ``` ```` marker is dropped along with the
/// whitespace that follows it; surrounding prose is left alone, so a reply
/// like `Sure! {"a": 1}` still fails to parse downstream.
pub fn strip_code_fences(text: &str) -> String {
    CODE_FENCE.replace_all(text, "").trim().to_string()
}

/// First `max_chars` characters of `text`, cut on a char boundary.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Join `items` with `", "` as given, or return `fallback` when that is empty.
pub fn join_or(items: &[String], fallback: &str) -> String {
    let joined = items.join(", ");
    if joined.is_empty() {
        fallback.to_string()
    } else {
        joined
    }
}

/// `text`, or `fallback` when it is blank.
pub fn or_fallback<'a>(text: &'a str, fallback: &'a str) -> &'a str {
    if text.trim().is_empty() { fallback } else { text }
}
