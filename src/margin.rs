//! Script-boundary margin annotation for Latin runs embedded in CJK text.
//!
//! Scans a fragment left to right, splits it into maximal runs of Latin
//! characters, and classifies each run by its immediate neighbors: a run
//! bordered by CJK gets a margin role so a stylesheet (or the plain-space
//! renderer) can open up visual spacing at the script boundary.
//!
//! A single scan replaces the chained regex substitutions this started out
//! as; each run is classified exactly once, so already-annotated output is
//! never wrapped a second time.

use crate::charclass::{
    blocks_both_margin, is_cjk, is_latin, is_soft_boundary, precedes_right_margin,
};

/// Which side(s) of a Latin run border CJK text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarginRole {
    /// CJK on the left, soft boundary (space or punctuation) on the right.
    Left,
    /// CJK on the left, no soft boundary on the right.
    Both,
    /// Punctuation or start-of-fragment on the left, CJK on the right.
    Right,
}

impl MarginRole {
    /// CSS class attached to the wrapping span.
    pub fn css_class(self) -> &'static str {
        match self {
            MarginRole::Left => "margin_add_left",
            MarginRole::Both => "margin_add_both",
            MarginRole::Right => "margin_add_right",
        }
    }
}

/// How annotated runs are rendered back into the fragment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MarginStyle {
    /// Wrap the run in `<span class='margin_add_*'>` markup.
    #[default]
    Spans,
    /// Insert plain half-width spaces instead of markup (Markdown output).
    Spaces,
}

/// Classify one Latin run from the characters immediately around it.
///
/// The three rules are tried in a fixed order and at most one applies, so a
/// run receives at most one role.
fn classify_run(prev: Option<char>, next: Option<char>) -> Option<MarginRole> {
    if prev.is_some_and(is_cjk) {
        if next.is_some_and(is_soft_boundary) {
            return Some(MarginRole::Left);
        }
        if !next.is_some_and(blocks_both_margin) {
            return Some(MarginRole::Both);
        }
        return None;
    }
    let left_ok = match prev {
        None => true,
        Some(ch) => precedes_right_margin(ch),
    };
    if left_ok && next.is_some_and(is_cjk) {
        return Some(MarginRole::Right);
    }
    None
}

/// Annotate every CJK-adjacent Latin run in `text`.
///
/// Runs with no CJK neighbor are left untouched; a fragment with no Latin
/// runs comes back unchanged.
pub fn annotate_margins(text: &str, style: MarginStyle) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 32);
    let mut i = 0;

    while i < chars.len() {
        if !is_latin(chars[i]) {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        let start = i;
        while i < chars.len() && is_latin(chars[i]) {
            i += 1;
        }
        let run: String = chars[start..i].iter().collect();
        let prev = if start > 0 { Some(chars[start - 1]) } else { None };
        let next = chars.get(i).copied();

        match classify_run(prev, next) {
            Some(role) => render_run(&mut out, &run, role, style),
            None => out.push_str(&run),
        }
    }

    out
}

fn render_run(out: &mut String, run: &str, role: MarginRole, style: MarginStyle) {
    match style {
        MarginStyle::Spans => {
            out.push_str("<span class='");
            out.push_str(role.css_class());
            out.push_str("'>");
            out.push_str(run);
            out.push_str("</span>");
        }
        MarginStyle::Spaces => {
            out.push(' ');
            out.push_str(run);
            if role == MarginRole::Both {
                out.push(' ');
            }
        }
    }
}
