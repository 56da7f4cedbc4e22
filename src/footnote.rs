//! Footnote anchor cleanup for EPUB chapters.
//!
//! Two independent fixes for the markup Calibre and friends produce around
//! footnote markers:
//!
//! - [`swap_anchor_sup`] turns `<a href="..."><sup>3</sup></a>` into
//!   `<sup><a href="...">3</a></sup>` so the link does not inherit the
//!   superscript baseline;
//! - [`strip_sup_markers`] deletes every non-digit character of a `<sup>`
//!   marker, e.g. `(3)` becomes `3`.

use std::fs;
use std::path::Path;

use quick_xml::escape::unescape_with;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use crate::error::TypesetError;
use crate::rewrite::{emit, read_utf8, resolve_entity, split_prologue};

/// Move `<sup>` wrappers outside their enclosing `<a>` anchors.
///
/// For every `<a>` element whose subtree contains a `<sup>`, the anchor's
/// content is replaced by the sup's text and the sup (with its attributes)
/// is re-wrapped around the anchor. Anchors without a `<sup>` inside are
/// reproduced unchanged.
pub fn swap_anchor_sup(html: &str) -> Result<String, TypesetError> {
    let mut reader = Reader::from_str(html);
    reader.config_mut().trim_text(false);

    let mut writer = Writer::new(Vec::new());
    let mut buf = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| TypesetError::Parse(format!("XML error: {:?}", e)))?;

        match event {
            Event::Start(e) if e.name().as_ref() == b"a" => {
                let anchor = e.into_owned();
                buf.clear();
                rewrite_anchor(&mut reader, &mut writer, anchor, &mut buf)?;
            }
            Event::Eof => break,
            other => emit(&mut writer, other)?,
        }
        buf.clear();
    }

    let bytes = writer.into_inner();
    String::from_utf8(bytes).map_err(|e| TypesetError::Parse(format!("UTF-8 error: {:?}", e)))
}

/// Consume one `<a>` subtree (start tag already read) and write it back,
/// swapped if it contains a `<sup>`.
fn rewrite_anchor<W: std::io::Write>(
    reader: &mut Reader<&[u8]>,
    writer: &mut Writer<W>,
    anchor: BytesStart<'static>,
    buf: &mut Vec<u8>,
) -> Result<(), TypesetError> {
    let mut events: Vec<Event<'static>> = Vec::new();
    let mut sup_start: Option<BytesStart<'static>> = None;
    let mut sup_text = String::new();
    let mut in_sup = false;
    let mut depth = 1usize;

    loop {
        buf.clear();
        let event = reader
            .read_event_into(buf)
            .map_err(|e| TypesetError::Parse(format!("XML error: {:?}", e)))?;

        match &event {
            Event::Start(e) => {
                if e.name().as_ref() == b"a" {
                    depth += 1;
                } else if e.name().as_ref() == b"sup" && sup_start.is_none() {
                    sup_start = Some(e.clone().into_owned());
                    in_sup = true;
                }
            }
            Event::End(e) => {
                if e.name().as_ref() == b"a" {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                } else if e.name().as_ref() == b"sup" {
                    in_sup = false;
                }
            }
            Event::Text(e) => {
                if in_sup {
                    let text = e
                        .decode()
                        .map_err(|e| TypesetError::Parse(format!("Decode error: {:?}", e)))?;
                    sup_text.push_str(&text);
                }
            }
            Event::GeneralRef(e) => {
                if in_sup {
                    let name = e
                        .decode()
                        .map_err(|e| TypesetError::Parse(format!("Decode error: {:?}", e)))?;
                    let entity = format!("&{};", name);
                    if let Ok(resolved) = unescape_with(&entity, |n| resolve_entity(n)) {
                        sup_text.push_str(&resolved);
                    }
                }
            }
            Event::Eof => {
                return Err(TypesetError::Parse("unclosed <a> element".into()));
            }
            _ => {}
        }
        events.push(event.into_owned());
    }

    match sup_start {
        Some(sup) => {
            emit(writer, Event::Start(sup))?;
            emit(writer, Event::Start(anchor))?;
            emit(writer, Event::Text(BytesText::new(&sup_text)))?;
            emit(writer, Event::End(BytesEnd::new("a")))?;
            emit(writer, Event::End(BytesEnd::new("sup")))?;
        }
        None => {
            emit(writer, Event::Start(anchor))?;
            for event in events {
                emit(writer, event)?;
            }
            emit(writer, Event::End(BytesEnd::new("a")))?;
        }
    }
    Ok(())
}

/// Reduce the text of every `<sup>` element to its digits.
pub fn strip_sup_markers(html: &str) -> Result<String, TypesetError> {
    let mut reader = Reader::from_str(html);
    reader.config_mut().trim_text(false);

    let mut writer = Writer::new(Vec::new());
    let mut buf = Vec::new();
    let mut sup_depth = 0usize;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| TypesetError::Parse(format!("XML error: {:?}", e)))?;

        match event {
            Event::Start(e) => {
                if e.name().as_ref() == b"sup" {
                    sup_depth += 1;
                }
                emit(&mut writer, Event::Start(e))?;
            }
            Event::End(e) => {
                if e.name().as_ref() == b"sup" {
                    sup_depth = sup_depth.saturating_sub(1);
                }
                emit(&mut writer, Event::End(e))?;
            }
            Event::Text(e) if sup_depth > 0 => {
                let text = e
                    .decode()
                    .map_err(|e| TypesetError::Parse(format!("Decode error: {:?}", e)))?;
                let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
                emit(&mut writer, Event::Text(BytesText::new(&digits)))?;
            }
            Event::Eof => {
                // quick-xml does not flag missing end tags on its own.
                if sup_depth > 0 {
                    return Err(TypesetError::Parse("unclosed <sup> element".into()));
                }
                break;
            }
            other => emit(&mut writer, other)?,
        }
        buf.clear();
    }

    let bytes = writer.into_inner();
    String::from_utf8(bytes).map_err(|e| TypesetError::Parse(format!("UTF-8 error: {:?}", e)))
}

/// Apply [`swap_anchor_sup`] to one file in place.
pub fn swap_anchor_sup_file(path: &Path) -> Result<(), TypesetError> {
    apply_in_place(path, swap_anchor_sup)
}

/// Apply [`strip_sup_markers`] to one file in place.
pub fn strip_sup_markers_file(path: &Path) -> Result<(), TypesetError> {
    apply_in_place(path, strip_sup_markers)
}

fn apply_in_place(
    path: &Path,
    op: fn(&str) -> Result<String, TypesetError>,
) -> Result<(), TypesetError> {
    let display = path.display().to_string();
    let content = read_utf8(path)?;
    let (prologue, body) = split_prologue(&content);
    let rewritten = op(body)?;

    let mut out = String::with_capacity(prologue.len() + rewritten.len());
    out.push_str(prologue);
    out.push_str(&rewritten);
    fs::write(path, out).map_err(|e| TypesetError::io(&display, e))?;
    log::debug!("rewrote footnotes in '{}'", display);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_simple_anchor() {
        let html = r##"<p><a href="#fn3" id="r3"><sup>3</sup></a></p>"##;
        let out = swap_anchor_sup(html).unwrap();
        assert_eq!(out, r##"<p><sup><a href="#fn3" id="r3">3</a></sup></p>"##);
    }

    #[test]
    fn test_swap_keeps_sup_attributes() {
        let html = r##"<a href="#f"><sup class="calibre5">12</sup></a>"##;
        let out = swap_anchor_sup(html).unwrap();
        assert_eq!(out, r##"<sup class="calibre5"><a href="#f">12</a></sup>"##);
    }

    #[test]
    fn test_anchor_without_sup_unchanged() {
        let html = r##"<p><a href="ch2.xhtml">next chapter</a></p>"##;
        let out = swap_anchor_sup(html).unwrap();
        assert_eq!(out, html);
    }

    #[test]
    fn test_swap_drops_anchor_siblings_of_sup() {
        // The anchor's content collapses to the sup text, as the original
        // tool does.
        let html = r##"<a href="#f">note<sup>7</sup></a>"##;
        let out = swap_anchor_sup(html).unwrap();
        assert_eq!(out, r##"<sup><a href="#f">7</a></sup>"##);
    }

    #[test]
    fn test_swap_multiple_anchors() {
        let html = r##"<p><a href="#a"><sup>1</sup></a>和<a href="#b"><sup>2</sup></a></p>"##;
        let out = swap_anchor_sup(html).unwrap();
        assert_eq!(
            out,
            r##"<p><sup><a href="#a">1</a></sup>和<sup><a href="#b">2</a></sup></p>"##
        );
    }

    #[test]
    fn test_swap_collects_only_first_sup() {
        // A second sibling <sup> contributes neither markup nor text, the
        // same as the original tool's first-match lookup.
        let html = r##"<a href="#f"><sup>1</sup><sup>2</sup></a>"##;
        let out = swap_anchor_sup(html).unwrap();
        assert_eq!(out, r##"<sup><a href="#f">1</a></sup>"##);
    }

    #[test]
    fn test_swap_unclosed_anchor_is_error() {
        assert!(swap_anchor_sup("<a href=\"#\"><sup>1</sup>").is_err());
    }

    #[test]
    fn test_strip_parentheses() {
        let out = strip_sup_markers("<p><sup>(3)</sup></p>").unwrap();
        assert_eq!(out, "<p><sup>3</sup></p>");
    }

    #[test]
    fn test_strip_cjk_brackets() {
        let out = strip_sup_markers("<p><sup>［12］</sup></p>").unwrap();
        assert_eq!(out, "<p><sup>12</sup></p>");
    }

    #[test]
    fn test_strip_leaves_other_text_alone() {
        let out = strip_sup_markers("<p>(keep)<sup>(1)</sup></p>").unwrap();
        assert_eq!(out, "<p>(keep)<sup>1</sup></p>");
    }

    #[test]
    fn test_strip_unclosed_sup_is_error() {
        assert!(strip_sup_markers("<p><sup>(1)").is_err());
    }

    #[test]
    fn test_strip_nested_markup_in_sup() {
        let out = strip_sup_markers(r##"<sup><a href="#f">(9)</a></sup>"##).unwrap();
        assert_eq!(out, r##"<sup><a href="#f">9</a></sup>"##);
    }
}
