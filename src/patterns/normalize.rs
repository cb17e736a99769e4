//! Canonicalization of free-text error messages into pattern keys.

use regex::Regex;
use std::sync::OnceLock;

/// Token substituted for digit runs.
pub const PLACEHOLDER: &str = "#";

fn digit_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]+").expect("valid digit regex"))
}

fn disallowed_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9#\s]+").expect("valid character class regex"))
}

/// Normalize an error message into its pattern key.
///
/// Lowercases, replaces digit runs with [`PLACEHOLDER`], strips punctuation,
/// and collapses whitespace. Tokens that were nothing but a number carry no
/// pattern information and are dropped, so `"timeout 42"` and `"timeout"`
/// share a key while `"worker7 failed"` becomes `"worker# failed"`.
///
/// ```rust
/// use pulsewatch::patterns::normalize_message;
///
/// assert_eq!(normalize_message("Network  Timeout after 30s!"), "network timeout after #s");
/// assert_eq!(normalize_message("network timeout 42"), "network timeout");
/// ```
pub fn normalize_message(message: &str) -> String {
    let lowered = message.to_lowercase();
    let numbered = digit_runs().replace_all(&lowered, PLACEHOLDER);
    let stripped = disallowed_chars().replace_all(&numbered, " ");

    let key = stripped
        .split_whitespace()
        .filter(|token| token.chars().any(|c| c != '#'))
        .collect::<Vec<_>>()
        .join(" ");

    if key.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        key
    }
}
