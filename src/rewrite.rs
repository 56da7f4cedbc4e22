//! Text-node rewriting for XHTML documents.
//!
//! Streams a document through quick-xml, passing every text node to a
//! caller-supplied transform and writing all markup back out unchanged.
//! Text directly inside `script`, `style`, `sup` and `a` elements is left
//! alone; a leading `<?xml?>`/`<!DOCTYPE>` line is detached before parsing
//! and re-attached verbatim.
//!
//! Transformed text is written without re-escaping so injected span markup
//! survives serialization; resolved entities therefore come out as their
//! literal characters, which is what the downstream EPUB tooling expects.

use std::fs;
use std::path::Path;

use quick_xml::escape::unescape_with;
use quick_xml::events::{BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use crate::error::TypesetError;
use crate::typeset::Typesetter;

/// Elements whose direct text content must not be transformed.
fn is_protected_element(name: &str) -> bool {
    matches!(name, "script" | "style" | "sup" | "a")
}

/// Split a leading `<?xml?>` or `<!DOCTYPE>` line off the document.
///
/// Returns `(prologue, rest)`; the prologue is empty when the document does
/// not start with a declaration. The prologue keeps its line ending and is
/// reproduced byte-for-byte in the output.
pub fn split_prologue(content: &str) -> (&str, &str) {
    if content.starts_with("<?xml") || content.starts_with("<!DOCTYPE") {
        match content.find('\n') {
            Some(pos) => content.split_at(pos + 1),
            None => (content, ""),
        }
    } else {
        ("", content)
    }
}

/// Rewrite every unprotected text node of an XHTML fragment.
///
/// `transform` receives the decoded text of one node and returns the
/// replacement, which is written out verbatim (no escaping).
pub fn rewrite_document<F>(html: &str, mut transform: F) -> Result<String, TypesetError>
where
    F: FnMut(&str) -> String,
{
    let mut reader = Reader::from_str(html);
    reader.config_mut().trim_text(false);

    let mut writer = Writer::new(Vec::new());
    let mut buf = Vec::new();

    // Innermost-first stack of open element names.
    let mut element_stack: Vec<String> = Vec::new();
    // Text and resolved entities accumulate here until the next markup
    // event, so a node split by an entity reference is transformed whole.
    let mut pending = String::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| TypesetError::Parse(format!("XML error: {:?}", e)))?;

        match event {
            Event::Text(e) => {
                let text = e
                    .decode()
                    .map_err(|e| TypesetError::Parse(format!("Decode error: {:?}", e)))?;
                pending.push_str(&text);
            }
            Event::GeneralRef(e) => {
                let name = e
                    .decode()
                    .map_err(|e| TypesetError::Parse(format!("Decode error: {:?}", e)))?;
                let entity = format!("&{};", name);
                match unescape_with(&entity, |n| resolve_entity(n)) {
                    Ok(resolved) => pending.push_str(&resolved),
                    Err(_) => {
                        // Unknown entity: keep it as written, outside the
                        // transformed fragment so its '&' and ';' survive.
                        flush_pending(&mut writer, &mut pending, &element_stack, &mut transform)?;
                        emit(&mut writer, Event::Text(BytesText::from_escaped(entity)))?;
                    }
                }
            }
            Event::Start(e) => {
                flush_pending(&mut writer, &mut pending, &element_stack, &mut transform)?;
                let name = decode_name(e.name().as_ref(), &reader)?;
                emit(&mut writer, Event::Start(e))?;
                element_stack.push(name);
            }
            Event::End(e) => {
                flush_pending(&mut writer, &mut pending, &element_stack, &mut transform)?;
                element_stack.pop();
                emit(&mut writer, Event::End(e))?;
            }
            Event::Empty(e) => {
                flush_pending(&mut writer, &mut pending, &element_stack, &mut transform)?;
                emit(&mut writer, Event::Empty(e))?;
            }
            Event::CData(e) => {
                // Raw sections pass through untouched.
                flush_pending(&mut writer, &mut pending, &element_stack, &mut transform)?;
                emit(&mut writer, Event::CData(e))?;
            }
            Event::Comment(e) => {
                flush_pending(&mut writer, &mut pending, &element_stack, &mut transform)?;
                emit(&mut writer, Event::Comment(e))?;
            }
            Event::Decl(e) => {
                emit(&mut writer, Event::Decl(e))?;
            }
            Event::PI(e) => {
                flush_pending(&mut writer, &mut pending, &element_stack, &mut transform)?;
                emit(&mut writer, Event::PI(e))?;
            }
            Event::DocType(e) => {
                emit(&mut writer, Event::DocType(e))?;
            }
            Event::Eof => {
                // quick-xml does not flag missing end tags on its own.
                if let Some(name) = element_stack.last() {
                    return Err(TypesetError::Parse(format!("unclosed <{}> element", name)));
                }
                flush_pending(&mut writer, &mut pending, &element_stack, &mut transform)?;
                break;
            }
        }
        buf.clear();
    }

    let bytes = writer.into_inner();
    String::from_utf8(bytes).map_err(|e| TypesetError::Parse(format!("UTF-8 error: {:?}", e)))
}

/// Write out accumulated text, transforming it unless the innermost open
/// element is protected.
fn flush_pending<W: std::io::Write>(
    writer: &mut Writer<W>,
    pending: &mut String,
    element_stack: &[String],
    transform: &mut impl FnMut(&str) -> String,
) -> Result<(), TypesetError> {
    if pending.is_empty() {
        return Ok(());
    }
    let protected = element_stack
        .last()
        .is_some_and(|name| is_protected_element(name));
    let text = if protected {
        std::mem::take(pending)
    } else {
        let out = transform(pending);
        pending.clear();
        out
    };
    emit(writer, Event::Text(BytesText::from_escaped(text)))
}

pub(crate) fn emit<W: std::io::Write>(
    writer: &mut Writer<W>,
    event: Event<'_>,
) -> Result<(), TypesetError> {
    writer
        .write_event(event)
        .map_err(|e| TypesetError::Parse(format!("Write error: {:?}", e)))
}

/// Resolve the XML predefined entities plus the HTML names that show up in
/// real EPUB content. Numeric references are handled by the caller.
pub(crate) fn resolve_entity(name: &str) -> Option<&'static str> {
    let ch = match name {
        "lt" => "<",
        "gt" => ">",
        "amp" => "&",
        "apos" => "'",
        "quot" => "\"",
        "nbsp" => "\u{a0}",
        "ensp" => "\u{2002}",
        "emsp" => "\u{2003}",
        "thinsp" => "\u{2009}",
        "ndash" => "–",
        "mdash" => "—",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "hellip" => "…",
        "middot" => "·",
        "times" => "×",
        "copy" => "©",
        _ => return None,
    };
    Some(ch)
}

fn decode_name(name: &[u8], reader: &Reader<&[u8]>) -> Result<String, TypesetError> {
    reader
        .decoder()
        .decode(name)
        .map_err(|e| TypesetError::Parse(format!("Decode error: {:?}", e)))
        .map(|s| s.to_string())
}

/// Rewrite one HTML/XHTML file in place with the given typesetter.
pub fn rewrite_html_file(path: &Path, typesetter: &Typesetter) -> Result<(), TypesetError> {
    let display = path.display().to_string();
    let content = read_utf8(path)?;
    let (prologue, body) = split_prologue(&content);

    let rewritten = rewrite_document(body, |text| typesetter.transform(text))?;

    let mut out = String::with_capacity(prologue.len() + rewritten.len());
    out.push_str(prologue);
    out.push_str(&rewritten);
    fs::write(path, out).map_err(|e| TypesetError::io(&display, e))?;
    log::debug!("rewrote '{}'", display);
    Ok(())
}

/// Read a file, mapping invalid UTF-8 to a dedicated error.
pub(crate) fn read_utf8(path: &Path) -> Result<String, TypesetError> {
    let display = path.display().to_string();
    let bytes = fs::read(path).map_err(|e| TypesetError::io(&display, e))?;
    String::from_utf8(bytes).map_err(|_| TypesetError::NotUtf8 { path: display })
}
