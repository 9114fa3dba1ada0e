//! Test harness for both front ends against fixture files.
//!
//! Valid inputs live in test/json/ and test/yaml/, each next to a `.tree`
//! file holding the expected tree dump. Invalid inputs live in test/bad/,
//! each next to a `.error` file holding the exact rendered diagnostics.

use std::fs;
use std::path::{Path, PathBuf};

use glob::glob;
use libslz::{encode, parse, parse_with_filename, Format, Syntax};
use pretty_assertions::assert_eq;

/// Root test directory.
fn test_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("test")
}

/// All fixture files matching a pattern relative to test/.
fn fixture_files(pattern: &str) -> Vec<PathBuf> {
    let pattern = test_root().join(pattern);
    let mut files: Vec<PathBuf> = glob(&pattern.to_string_lossy())
        .expect("valid glob pattern")
        .flatten()
        .collect();
    files.sort();
    files
}

fn file_name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().to_string()
}

fn syntax_of(path: &Path) -> Result<Syntax, String> {
    Syntax::from_path(path).ok_or_else(|| format!("{}: unknown fixture type", file_name(path)))
}

/// Run a single valid fixture and compare its tree dump.
fn run_good_test(path: &Path) -> Result<(), String> {
    let filename = file_name(path);
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", filename, e))?;

    let document = parse(&content, syntax_of(path)?)
        .map_err(|e| format!("{}: Unexpected parse error: {}", filename, e))?;
    let actual = encode(&document, Format::Tree);

    match fs::read_to_string(path.with_extension("tree")) {
        Ok(expected) => {
            if actual != expected {
                return Err(format!(
                    "{}: Output mismatch\n--- expected\n{}--- actual\n{}",
                    filename, expected, actual
                ));
            }
            println!("  {} => ok", filename);
        }
        Err(_) => println!("  {} => {:?} (no expected output)", filename, document.root()),
    }
    Ok(())
}

/// Run a single invalid fixture (expected to fail with specific errors).
fn run_bad_test(path: &Path) -> Result<(), String> {
    let filename = file_name(path);
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", filename, e))?;

    let error = match parse_with_filename(&content, syntax_of(path)?, Some(&filename)) {
        Ok(document) => {
            return Err(format!(
                "{}: Expected parse error, but got success: {:?}",
                filename,
                document.root()
            ))
        }
        Err(e) => e,
    };

    if error.diagnostics().is_empty() {
        return Err(format!("{}: Failure without diagnostics", filename));
    }

    let actual = error.to_string();
    match fs::read_to_string(path.with_extension("error")) {
        Ok(expected) => {
            let expected = expected.trim_end();
            if actual != expected {
                return Err(format!(
                    "{}: Error mismatch\n    expected: {}\n    actual:   {}",
                    filename, expected, actual
                ));
            }
            println!("  {} => error (as expected)", filename);
        }
        Err(_) => println!("  {} => error: {} (no .error file to compare)", filename, actual),
    }
    Ok(())
}

fn run_all(label: &str, files: &[PathBuf], run: fn(&Path) -> Result<(), String>) {
    assert!(!files.is_empty(), "no {} fixtures found", label);
    println!("\nRunning {} {} fixtures:", files.len(), label);

    let mut passed = 0;
    let mut errors: Vec<String> = Vec::new();

    for file in files {
        match run(file) {
            Ok(()) => passed += 1,
            Err(e) => errors.push(e),
        }
    }

    println!("\nResults: {} passed, {} failed", passed, errors.len());

    if !errors.is_empty() {
        println!("\nErrors:");
        for error in &errors {
            println!("  - {}", error);
        }
    }

    assert!(errors.is_empty(), "{} {} fixtures failed", errors.len(), label);
}

#[test]
fn test_all_json_fixtures() {
    run_all("json", &fixture_files("json/*.json"), run_good_test);
}

#[test]
fn test_all_yaml_fixtures() {
    run_all("yaml", &fixture_files("yaml/*.yaml"), run_good_test);
}

#[test]
fn test_all_bad_fixtures() {
    let mut files = fixture_files("bad/*.json");
    files.extend(fixture_files("bad/*.yaml"));
    run_all("bad", &files, run_bad_test);
}

/// Every valid fixture survives a trip through the JSON encoder and back.
#[test]
fn test_json_rendering_of_fixtures() {
    let mut files = fixture_files("json/*.json");
    files.extend(fixture_files("yaml/*.yaml"));

    for file in &files {
        let content = fs::read_to_string(file).unwrap();
        let document = parse(&content, Syntax::from_path(file).unwrap()).unwrap();
        let json = encode(&document, Format::Json);
        let again = parse(&json, Syntax::Json)
            .unwrap_or_else(|e| panic!("{}: rendered JSON did not parse: {}\n{}", file.display(), e, json));
        assert_eq!(document.root(), again.root(), "{}", file.display());
    }
}

/// The same data written in both grammars builds the same document.
#[test]
fn test_grammars_agree_on_fixture_data() {
    let json = parse(r#"{"tags": ["player", "animated sprite"], "scale": 2.0}"#, Syntax::Json).unwrap();
    let yaml = parse("tags:\n  - player\n  - 'animated sprite'\nscale: 2.0\n", Syntax::Yaml).unwrap();
    assert_eq!(json, yaml);
}
