//! Two-pass fragment transform: punctuation substitution, then margin
//! annotation.
//!
//! Substitution runs first so the annotator sees full-width punctuation
//! when it inspects run neighbors.

use crate::fullwidth::to_full_width;
use crate::margin::{annotate_margins, MarginStyle};

/// Configured fragment transformer.
///
/// A `Typesetter` holds no mutable state; `transform` is a pure function
/// and the same instance can be reused for every fragment of a document.
#[derive(Clone, Copy, Debug, Default)]
pub struct Typesetter {
    style: MarginStyle,
}

impl Typesetter {
    /// Transformer producing `<span class='margin_add_*'>` markup.
    pub fn new() -> Self {
        Self::default()
    }

    /// Transformer with an explicit margin render style.
    pub fn with_style(style: MarginStyle) -> Self {
        Self { style }
    }

    /// Apply both passes to one text fragment.
    pub fn transform(&self, text: &str) -> String {
        annotate_margins(&to_full_width(text), self.style)
    }
}
