use std::env;
use std::path::Path;
use std::process::ExitCode;

use cjk_typeset::{
    epub_to_markdown_file, process_path, rewrite_html_file, strip_sup_markers_file,
    swap_anchor_sup_file, TypesetError, Typesetter,
};

fn main() -> ExitCode {
    env_logger::init();
    match run(env::args().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("error: {}", msg);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), String> {
    let mut rest = args.into_iter().skip(1).collect::<Vec<_>>();

    if rest.is_empty() || rest[0] == "--help" || rest[0] == "-h" {
        print_help();
        return Ok(());
    }

    let cmd = rest.remove(0);
    match cmd.as_str() {
        "convert" => {
            let path = first_arg(&rest, "convert requires <path>")?;
            let typesetter = Typesetter::new();
            run_batch(Path::new(&path), |file| rewrite_html_file(file, &typesetter))
        }
        "fix-footnotes" => {
            let path = first_arg(&rest, "fix-footnotes requires <path>")?;
            run_batch(Path::new(&path), swap_anchor_sup_file)
        }
        "strip-sup" => {
            let path = first_arg(&rest, "strip-sup requires <path>")?;
            run_batch(Path::new(&path), strip_sup_markers_file)
        }
        "markdown" => {
            let mut args = rest;
            let add_spaces = pop_flag(&mut args, "--add-spaces");
            let epub = first_arg(&args, "markdown requires <epub_path> <output_md>")?;
            let output = args
                .get(1)
                .cloned()
                .ok_or_else(|| "markdown requires <epub_path> <output_md>".to_string())?;
            epub_to_markdown_file(Path::new(&epub), Path::new(&output), add_spaces)
                .map_err(|e| e.to_string())
        }
        _ => Err(format!(
            "unknown command '{}'; run `cjk-typeset --help` for usage",
            cmd
        )),
    }
}

/// Apply one per-file operation over a file or directory tree.
///
/// Invalid paths and unsupported extensions print a diagnostic and exit
/// successfully; other errors are fatal.
fn run_batch<F>(path: &Path, op: F) -> Result<(), String>
where
    F: FnMut(&Path) -> Result<(), TypesetError>,
{
    match process_path(path, op) {
        Ok(count) => {
            log::info!("processed {} file(s)", count);
            Ok(())
        }
        Err(err @ (TypesetError::InvalidPath { .. } | TypesetError::UnsupportedExtension { .. })) => {
            println!("{}", err);
            Ok(())
        }
        Err(err) => Err(err.to_string()),
    }
}

fn first_arg(args: &[String], msg: &str) -> Result<String, String> {
    args.first().cloned().ok_or_else(|| msg.to_string())
}

fn pop_flag(args: &mut Vec<String>, flag: &str) -> bool {
    if let Some(pos) = args.iter().position(|a| a == flag) {
        args.remove(pos);
        true
    } else {
        false
    }
}

fn print_help() {
    let help = r#"cjk-typeset - typography post-processor for Chinese/Latin EPUB content

USAGE:
  cjk-typeset <command> [args...]

COMMANDS:
  convert <path>                    full-width punctuation + margin spans
                                    over an .html/.xhtml file or directory
  fix-footnotes <path>              move <sup> wrappers outside footnote <a> anchors
  strip-sup <path>                  reduce <sup> footnote markers to digits
  markdown <epub> <out.md> [--add-spaces]
                                    extract EPUB content to Markdown

NOTES:
  - Directories are walked recursively for .html/.xhtml files.
  - Files are rewritten in place.
  - --add-spaces inserts half-width spaces at CJK/Latin boundaries.
"#;
    println!("{}", help);
}
