//! Half-width to full-width punctuation substitution.
//!
//! Replaces ASCII punctuation with its full-width CJK equivalent, with two
//! fragment-wide exceptions: commas that look like part of an English
//! sentence and colons that look like part of a URL are left alone. Both
//! guards are evaluated once against the whole fragment, so a single match
//! anywhere suppresses every substitution of that character in the fragment.
//! This matches the behavior book producers already depend on, even though
//! it under-substitutes when an unrelated English comma or URL shares the
//! fragment.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// English-sentence comma: `word, word`.
    static ref ENGLISH_COMMA_RE: Regex = Regex::new(r"[A-Za-z]+, [A-Za-z]+").unwrap();
    /// URL-like colon: `scheme:rest` with letters or slashes after it.
    static ref URL_COLON_RE: Regex = Regex::new(r"[A-Za-z]+:[A-Za-z/]+").unwrap();
}

/// Full-width equivalent for a substitutable ASCII punctuation character.
///
/// Returns `None` for characters outside the table.
pub fn full_width_of(ch: char) -> Option<char> {
    let full = match ch {
        '!' => '！',
        '$' => '＄',
        '&' => '＆',
        '(' => '（',
        ')' => '）',
        '*' => '＊',
        '+' => '＋',
        ',' => '，',
        ':' => '：',
        ';' => '；',
        '<' => '＜',
        '=' => '＝',
        '>' => '＞',
        '?' => '？',
        '[' => '［',
        '\\' => '＼',
        ']' => '］',
        '^' => '＾',
        '`' => '｀',
        '{' => '｛',
        '|' => '｜',
        '}' => '｝',
        '~' => '～',
        _ => return None,
    };
    Some(full)
}

/// Replace half-width punctuation with full-width forms.
///
/// The comma and colon guards are decided once for the whole fragment from
/// the original text, not per occurrence.
pub fn to_full_width(text: &str) -> String {
    let keep_commas = ENGLISH_COMMA_RE.is_match(text);
    let keep_colons = URL_COLON_RE.is_match(text);

    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if (ch == ',' && keep_commas) || (ch == ':' && keep_colons) {
            out.push(ch);
            continue;
        }
        out.push(full_width_of(ch).unwrap_or(ch));
    }
    out
}
