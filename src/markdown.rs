//! EPUB content extraction to Markdown.
//!
//! Reads the `.html`/`.xhtml` entries of an EPUB archive in name order and
//! reduces each to Markdown: headings become `#` lines, paragraphs become
//! text blocks, list items become bullets. Everything else (styling,
//! images, navigation) is dropped.

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use quick_xml::escape::unescape_with;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use zip::ZipArchive;

use crate::error::TypesetError;
use crate::margin::{annotate_margins, MarginStyle};
use crate::rewrite::resolve_entity;

/// Extract an EPUB archive to one Markdown string.
///
/// With `add_spaces` set, every extracted block is passed through the
/// margin annotator in plain-space mode, inserting half-width spaces at
/// CJK/Latin boundaries.
pub fn epub_to_markdown(epub_path: &Path, add_spaces: bool) -> Result<String, TypesetError> {
    let display = epub_path.display().to_string();
    let file = File::open(epub_path).map_err(|e| TypesetError::io(&display, e))?;
    let mut archive = ZipArchive::new(file)?;

    // Mirror the walk order book producers expect: all .html entries in
    // sorted order, then all .xhtml entries.
    let mut html_names = Vec::new();
    let mut xhtml_names = Vec::new();
    for name in archive.file_names() {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".html") {
            html_names.push(name.to_string());
        } else if lower.ends_with(".xhtml") {
            xhtml_names.push(name.to_string());
        }
    }
    html_names.sort();
    xhtml_names.sort();
    html_names.extend(xhtml_names);

    let mut documents = Vec::new();
    for name in &html_names {
        let mut entry = archive.by_name(name)?;
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| TypesetError::io(name, e))?;
        let html = String::from_utf8(bytes).map_err(|_| TypesetError::NotUtf8 {
            path: name.clone(),
        })?;

        match html_to_markdown(&html, add_spaces) {
            Ok(text) if !text.is_empty() => documents.push(text),
            Ok(_) => {}
            Err(err) => {
                log::warn!("skipping EPUB entry '{}': {}", name, err);
            }
        }
    }

    Ok(documents.join("\n\n"))
}

/// Extract an EPUB and write the Markdown to `output`.
pub fn epub_to_markdown_file(
    epub_path: &Path,
    output: &Path,
    add_spaces: bool,
) -> Result<(), TypesetError> {
    let markdown = epub_to_markdown(epub_path, add_spaces)?;
    fs::write(output, markdown).map_err(|e| TypesetError::io(output.display().to_string(), e))
}

/// Block-level element currently being collected.
#[derive(Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Heading(u8),
    Paragraph,
    ListItem,
}

/// Convert one XHTML document to Markdown lines.
pub fn html_to_markdown(html: &str, add_spaces: bool) -> Result<String, TypesetError> {
    let mut reader = Reader::from_str(html);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut lines: Vec<String> = Vec::new();
    let mut block: Option<BlockKind> = None;
    let mut text = String::new();
    let mut skip_depth = 0usize;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| TypesetError::Parse(format!("XML error: {:?}", e)))?;

        match event {
            Event::Start(e) => {
                let name = reader
                    .decoder()
                    .decode(e.name().as_ref())
                    .map_err(|e| TypesetError::Parse(format!("Decode error: {:?}", e)))?
                    .to_string();
                if matches!(name.as_str(), "script" | "style" | "head") {
                    skip_depth += 1;
                    continue;
                }
                if skip_depth > 0 {
                    continue;
                }
                if let Some(kind) = block_kind(&name) {
                    // A new block closes whatever was being collected.
                    finish_block(&mut lines, &mut text, block.take(), add_spaces);
                    block = Some(kind);
                }
            }
            Event::End(e) => {
                let name = reader
                    .decoder()
                    .decode(e.name().as_ref())
                    .map_err(|e| TypesetError::Parse(format!("Decode error: {:?}", e)))?
                    .to_string();
                if matches!(name.as_str(), "script" | "style" | "head") {
                    skip_depth = skip_depth.saturating_sub(1);
                    continue;
                }
                if skip_depth > 0 {
                    continue;
                }
                if block_kind(&name) == block {
                    finish_block(&mut lines, &mut text, block.take(), add_spaces);
                }
            }
            Event::Text(e) if skip_depth == 0 && block.is_some() => {
                let t = e
                    .decode()
                    .map_err(|e| TypesetError::Parse(format!("Decode error: {:?}", e)))?;
                text.push_str(&t);
            }
            Event::GeneralRef(e) if skip_depth == 0 && block.is_some() => {
                let name = e
                    .decode()
                    .map_err(|e| TypesetError::Parse(format!("Decode error: {:?}", e)))?;
                let entity = format!("&{};", name);
                if let Ok(resolved) = unescape_with(&entity, |n| resolve_entity(n)) {
                    text.push_str(&resolved);
                }
            }
            Event::Eof => {
                finish_block(&mut lines, &mut text, block.take(), add_spaces);
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    // Trim trailing paragraph separators.
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    Ok(lines.join("\n"))
}

fn block_kind(name: &str) -> Option<BlockKind> {
    match name {
        "p" => Some(BlockKind::Paragraph),
        "li" => Some(BlockKind::ListItem),
        h if h.len() == 2 && h.starts_with('h') => {
            let level = h.chars().nth(1).and_then(|c| c.to_digit(10))?;
            if (1..=6).contains(&level) {
                Some(BlockKind::Heading(level as u8))
            } else {
                None
            }
        }
        _ => None,
    }
}

fn finish_block(
    lines: &mut Vec<String>,
    text: &mut String,
    block: Option<BlockKind>,
    add_spaces: bool,
) {
    let collected = normalize_whitespace(text);
    text.clear();
    let Some(kind) = block else {
        return;
    };
    if collected.is_empty() {
        return;
    }
    let collected = if add_spaces {
        annotate_margins(&collected, MarginStyle::Spaces)
    } else {
        collected
    };
    match kind {
        BlockKind::Heading(level) => {
            lines.push(format!("{} {}", "#".repeat(level as usize), collected));
            lines.push(String::new());
        }
        BlockKind::Paragraph => {
            lines.push(collected);
            lines.push(String::new());
        }
        BlockKind::ListItem => {
            lines.push(format!("- {}", collected));
        }
    }
}

/// Collapse runs of whitespace to single spaces and trim the ends.
fn normalize_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_was_space = true;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !prev_was_space {
                result.push(' ');
                prev_was_space = true;
            }
        } else {
            result.push(ch);
            prev_was_space = false;
        }
    }
    if result.ends_with(' ') {
        result.pop();
    }
    result
}
