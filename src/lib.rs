//! cjk-typeset -- Typography post-processor for mixed Chinese/Latin book content
//!
//! Fixes the typographic seams left behind when EPUB producers mix Chinese
//! and Latin scripts: ASCII punctuation is promoted to its full-width CJK
//! form (with URL and English-sentence escape hatches), and Latin runs
//! embedded in Chinese text are wrapped in margin-role spans so a stylesheet
//! can open up spacing at the script boundary.
//!
//! The core transforms ([`fullwidth`], [`margin`], [`typeset`]) are pure
//! string functions; the host modules ([`rewrite`], [`footnote`],
//! [`markdown`], [`walk`]) apply them to XHTML files, EPUB archives, and
//! directory trees.

#![warn(missing_docs)]
#![warn(
    clippy::needless_collect,
    clippy::map_clone,
    clippy::implicit_clone,
    clippy::inefficient_to_string
)]

pub mod charclass;
pub mod error;
pub mod footnote;
pub mod fullwidth;
pub mod margin;
pub mod markdown;
pub mod rewrite;
pub mod typeset;
pub mod walk;

// Re-export key types for convenience
pub use error::TypesetError;
pub use footnote::{strip_sup_markers, strip_sup_markers_file, swap_anchor_sup, swap_anchor_sup_file};
pub use fullwidth::to_full_width;
pub use margin::{annotate_margins, MarginRole, MarginStyle};
pub use markdown::{epub_to_markdown, epub_to_markdown_file, html_to_markdown};
pub use rewrite::{rewrite_document, rewrite_html_file, split_prologue};
pub use typeset::Typesetter;
pub use walk::{collect_supported_files, has_supported_extension, process_path};
