//! Read a font description from a JSON or YAML file and print its glyph
//! advances.
//!
//! Usage: cargo run --example font_metrics -- <path>

use libslz::{parse_with_filename, Syntax, Value};
use std::env;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    let Some(path) = env::args().nth(1) else {
        eprintln!("usage: font_metrics <path>");
        return ExitCode::FAILURE;
    };
    let path = Path::new(&path);

    let Some(syntax) = Syntax::from_path(path) else {
        eprintln!("{}: expected a .json, .yaml or .yml file", path.display());
        return ExitCode::FAILURE;
    };

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("{}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let filename = path.file_name().map(|n| n.to_string_lossy().to_string());
    let document = match parse_with_filename(&content, syntax, filename.as_deref()) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let font = document.root();
    println!(
        "{} ({}px)",
        font.get("name").as_str().unwrap_or("<unnamed>"),
        font.get("size").as_i64().unwrap_or(0)
    );
    for glyph in font.get("glyphs").items() {
        print_glyph(glyph);
    }
    ExitCode::SUCCESS
}

fn print_glyph(glyph: Value<'_>) {
    let ch = glyph.get("char").as_str().unwrap_or("?");
    let advance = glyph.get("advance").as_i64().unwrap_or(0);
    match glyph.get("descent").as_i64() {
        Some(descent) => println!("  {ch}: advance {advance}, descent {descent}"),
        None => println!("  {ch}: advance {advance}"),
    }
}
