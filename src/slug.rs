//! Canonical storage keys for branded token names.
//!
//! A slug is the lower-cased ASCII transliteration of a name, with every run
//! of other characters replaced by a single dash. Two names that produce the
//! same slug refer to the same branded token, which keeps near-duplicate and
//! look-alike brands ("Sand Coin", "sand-coin", "Тоken" spelled with Cyrillic
//! letters) from coexisting. Slugs are persisted as record keys, so the
//! mapping below must never change once data has been written.

use deunicode::deunicode_with_tofu;

const SEPARATOR: char = '-';

/// Derive the canonical slug for a raw token name
///
/// Quotes are dropped, `&` and `@` are spelled out, everything else goes
/// through Unicode transliteration. ASCII letters, digits, `-` and `_` are
/// kept; any other run of characters becomes one `-`. Leading and trailing
/// `-` and `_` are trimmed.
pub fn normalize(raw: &str) -> String {
    let ascii = deunicode_with_tofu(&substitute(raw), "");

    let mut slug = String::with_capacity(ascii.len());
    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with(SEPARATOR) {
            slug.push(SEPARATOR);
        }
    }

    slug.trim_matches(|c| c == SEPARATOR || c == '_').to_string()
}

/// Replacements applied before transliteration
fn substitute(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '"' | '\'' | '\u{2019}' => {}
            '&' => out.push_str("and"),
            '@' => out.push_str("at"),
            _ => out.push(c),
        }
    }
    out
}
