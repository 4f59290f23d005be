//! Markup escaping.
//!
//! Rewrites `&`, `<`, `>` and `"` to their entity forms. An ampersand
//! that already starts an entity (`&word;` or `&#digits;`) is left
//! alone, so escaping already-escaped output does not double it.

use crate::chars;

/// Escape a string for safe inclusion in markup.
pub fn escape_markup(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 8);
    for (index, ch) in input.char_indices() {
        match ch {
            chars::LT => out.push_str("&lt;"),
            chars::GT => out.push_str("&gt;"),
            chars::DQ => out.push_str("&quot;"),
            chars::AMPERSAND => {
                if continues_entity(&input[index + ch.len_utf8()..]) {
                    out.push(chars::AMPERSAND);
                } else {
                    out.push_str("&amp;");
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// True when `rest` starts with the remainder of an entity: a run of
/// word characters or `#` plus digits, terminated by `;`.
fn continues_entity(rest: &str) -> bool {
    let mut chars_iter = rest.chars();
    match chars_iter.next() {
        Some(chars::HASH) => {
            let digits = rest[1..].chars().take_while(|c| chars::is_digit(*c)).count();
            digits > 0 && rest[1 + digits..].starts_with(chars::SEMICOLON)
        }
        Some(first) if chars::is_word_char(first) => {
            // Word characters are ASCII, so the count doubles as a byte offset.
            let word = rest.chars().take_while(|c| chars::is_word_char(*c)).count();
            rest[word..].starts_with(chars::SEMICOLON)
        }
        _ => false,
    }
}
