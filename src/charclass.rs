//! Character classes shared by the full-width substitutor and the
//! margin annotator.
//!
//! The sets are fixed: CJK ideographs by code-point range, a closed set of
//! Latin run characters (ASCII letters/digits, the accented letters that
//! appear in the books we process, and a few symbols that belong inside a
//! Latin run rather than at its boundary), and the punctuation sets that
//! delimit runs on either side.

/// Accented Latin letters treated as part of a Latin run.
const ACCENTED: &str = "éèàçâêîôûëïüÿœæÆŒÉÈÀÇÂÊÎÔÛËÏÜŸ";

/// Symbol characters that join a Latin run instead of terminating it.
const RUN_SYMBOLS: &str = "✕Φ%#";

/// True for CJK unified ideographs (U+4E00..U+9FFF).
pub fn is_cjk(ch: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&ch)
}

/// True for characters that form a Latin run: ASCII alphanumerics, the
/// fixed accented-letter set, and the run symbols.
pub fn is_latin(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ACCENTED.contains(ch) || RUN_SYMBOLS.contains(ch)
}

/// Soft boundary characters: a Latin run followed by one of these gets a
/// left-margin role when preceded by CJK.
pub fn is_soft_boundary(ch: char) -> bool {
    matches!(ch, ' ' | '.' | ',' | '—' | '（' | '）' | '，' | '。' | '\'')
}

/// Characters that veto the both-margin role on the follow side.
pub fn blocks_both_margin(ch: char) -> bool {
    matches!(ch, ' ' | '，' | '。' | '）' | '\'') || ACCENTED.contains(ch)
}

/// Punctuation and whitespace that may precede a right-margin run.
pub fn precedes_right_margin(ch: char) -> bool {
    matches!(
        ch,
        ' ' | '.'
            | ','
            | '，'
            | '。'
            | '：'
            | '；'
            | '\''
            | '—'
            | '（'
            | '）'
            | '［'
            | '］'
            | '、'
            | '？'
            | '·'
            | '《'
            | '》'
            | '・'
    )
}
