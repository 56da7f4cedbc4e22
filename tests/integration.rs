//! Integration tests for cjk-typeset
//!
//! Exercises the full pipeline over whole XHTML documents and over files on
//! disk, the way the CLI drives it.

use std::fs;
use std::path::PathBuf;

use cjk_typeset::{
    annotate_margins, process_path, rewrite_document, rewrite_html_file, split_prologue,
    strip_sup_markers_file, swap_anchor_sup_file, to_full_width, MarginStyle, Typesetter,
};

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("cjk-typeset-it-{}-{}", tag, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

// -- Fragment pipeline --------------------------------------------------------

#[test]
fn test_fragment_transforms() {
    let t = Typesetter::new();

    // Punctuation substitution with no guard present.
    assert_eq!(t.transform("Hello!"), "Hello！");

    // Fragment-wide comma guard.
    assert_eq!(to_full_width("A, B, 中文"), "A, B, 中文");

    // Fragment-wide URL colon guard.
    let url = "见 http://example.com 与 a:b";
    assert_eq!(to_full_width(url), url);

    // Three margin roles.
    assert_eq!(
        annotate_margins("中文ABC。", MarginStyle::Spans),
        "中文<span class='margin_add_left'>ABC</span>。"
    );
    assert_eq!(
        annotate_margins("中文ABC文字", MarginStyle::Spans),
        "中文<span class='margin_add_both'>ABC</span>文字"
    );
    assert_eq!(
        annotate_margins(" ABC中文", MarginStyle::Spans),
        " <span class='margin_add_right'>ABC</span>中文"
    );

    // Latin runs with no CJK neighbor are untouched.
    assert_eq!(annotate_margins("ABC DEF", MarginStyle::Spans), "ABC DEF");
}

#[test]
fn test_annotation_is_idempotent() {
    let once = annotate_margins("前言中ABC文字，参见 DEF中文。", MarginStyle::Spans);
    let twice = annotate_margins(&once, MarginStyle::Spans);
    assert_eq!(once, twice);
}

// -- Whole documents ----------------------------------------------------------

#[test]
fn test_document_rewrite_end_to_end() {
    let html = concat!(
        "<html><head><title>样本</title></head><body>",
        "<p>中文ABC文字,还有(注)。</p>",
        "<p>A, B and C are letters.</p>",
        "<p><sup>(1)</sup><a href=\"#fn\">脚注!</a></p>",
        "</body></html>"
    );
    let t = Typesetter::new();
    let out = rewrite_document(html, |text| t.transform(text)).unwrap();

    // Mixed CJK paragraph: substitution plus a both-margin span.
    assert!(out.contains("中文<span class='margin_add_both'>ABC</span>文字，还有（注）。"));
    // English sentence: comma guard holds.
    assert!(out.contains("A, B and C are letters."));
    // Protected containers untouched.
    assert!(out.contains("<sup>(1)</sup>"));
    assert!(out.contains(">脚注!</a>"));
    // Title is fair game (head is not a protected element for this tool).
    assert!(out.contains("<title>样本</title>"));
}

#[test]
fn test_file_roundtrip_preserves_doctype() {
    let dir = temp_dir("doctype");
    let file = dir.join("chapter.xhtml");
    let content = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<html><body><p>中文ABC。</p></body></html>";
    fs::write(&file, content).unwrap();

    rewrite_html_file(&file, &Typesetter::new()).unwrap();

    let rewritten = fs::read_to_string(&file).unwrap();
    assert!(rewritten.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n"));
    assert!(rewritten.contains("中文<span class='margin_add_left'>ABC</span>。"));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_prologue_detection() {
    let (prologue, rest) = split_prologue("<!DOCTYPE html>\n<html/>");
    assert_eq!(prologue, "<!DOCTYPE html>\n");
    assert_eq!(rest, "<html/>");

    let (prologue, rest) = split_prologue("<html/>");
    assert!(prologue.is_empty());
    assert_eq!(rest, "<html/>");
}

// -- Directory processing -----------------------------------------------------

#[test]
fn test_directory_walk_transforms_all_files() {
    let dir = temp_dir("tree");
    fs::create_dir_all(dir.join("text")).unwrap();
    fs::write(dir.join("a.html"), "<p>早上ABC好!</p>").unwrap();
    fs::write(dir.join("text/b.xhtml"), "<p>中文DEF文字</p>").unwrap();
    fs::write(dir.join("cover.css"), "p { margin: 0 }").unwrap();

    let typesetter = Typesetter::new();
    let processed = process_path(&dir, |path| rewrite_html_file(path, &typesetter)).unwrap();
    assert_eq!(processed, 2);

    let a = fs::read_to_string(dir.join("a.html")).unwrap();
    assert_eq!(a, "<p>早上<span class='margin_add_both'>ABC</span>好！</p>");
    let b = fs::read_to_string(dir.join("text/b.xhtml")).unwrap();
    assert_eq!(b, "<p>中文<span class='margin_add_both'>DEF</span>文字</p>");
    // Non-HTML files untouched.
    assert_eq!(
        fs::read_to_string(dir.join("cover.css")).unwrap(),
        "p { margin: 0 }"
    );

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_directory_walk_survives_broken_file() {
    let dir = temp_dir("broken");
    fs::write(dir.join("good.html"), "<p>好ABC。</p>").unwrap();
    fs::write(dir.join("broken.html"), "<p>unclosed").unwrap();

    let typesetter = Typesetter::new();
    let processed = process_path(&dir, |path| rewrite_html_file(path, &typesetter)).unwrap();
    assert_eq!(processed, 1);

    let good = fs::read_to_string(dir.join("good.html")).unwrap();
    assert!(good.contains("margin_add_left"));
    // The broken file is left exactly as it was.
    assert_eq!(
        fs::read_to_string(dir.join("broken.html")).unwrap(),
        "<p>unclosed"
    );

    fs::remove_dir_all(&dir).unwrap();
}

// -- Footnote tools -----------------------------------------------------------

#[test]
fn test_footnote_swap_then_strip() {
    let dir = temp_dir("footnote");
    let file = dir.join("notes.xhtml");
    fs::write(
        &file,
        "<p>正文<a href=\"#fn1\" id=\"ref1\"><sup class=\"calibre5\">(1)</sup></a>继续</p>",
    )
    .unwrap();

    swap_anchor_sup_file(&file).unwrap();
    let swapped = fs::read_to_string(&file).unwrap();
    assert_eq!(
        swapped,
        "<p>正文<sup class=\"calibre5\"><a href=\"#fn1\" id=\"ref1\">(1)</a></sup>继续</p>"
    );

    strip_sup_markers_file(&file).unwrap();
    let stripped = fs::read_to_string(&file).unwrap();
    assert_eq!(
        stripped,
        "<p>正文<sup class=\"calibre5\"><a href=\"#fn1\" id=\"ref1\">1</a></sup>继续</p>"
    );

    fs::remove_dir_all(&dir).unwrap();
}
