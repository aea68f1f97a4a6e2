//! Line tokenizer
//!
//! A token is a run of characters without ASCII whitespace or quotes, a
//! double-quoted span (quotes dropped, whitespace kept), or a single quote
//! followed by everything up to the next single quote. The single quote
//! opening such a token stays in the token.
//!
//! Only ASCII space, tab, newline, form feed and carriage return separate
//! tokens. Non-breaking spaces (`U+00A0`, byte `0xA0` in Windows-1252) are
//! common in player names and stay inside a token.

use std::sync::LazyLock;

use regex::Regex;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[^ \t\n\x0C\r"']+|"([^"]*)"|'([^']*)"#).expect("token pattern is valid")
});

/// Split a line into directive tokens
pub fn tokenize(line: &str) -> Vec<String> {
    TOKEN
        .find_iter(line)
        .map(|m| m.as_str().trim_matches('"').to_string())
        .collect()
}
