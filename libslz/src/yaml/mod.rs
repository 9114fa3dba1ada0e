//! YAML front end.

pub mod lexer;
pub mod parser;

use tracing::{debug, enabled, trace, Level};

use crate::diagnostics::Diagnostics;
use crate::document::Document;
use crate::encode::{encode, Format};
use crate::error::{Error, ParseContext, Result};
use crate::Syntax;

/// Lex and parse YAML text.
pub fn parse(input: &str, ctx: &ParseContext) -> Result<Document> {
    let mut diagnostics = Diagnostics::new(input, Syntax::Yaml, ctx);

    let tokens = lexer::tokenize(input, &mut diagnostics);
    if diagnostics.has_errors() {
        return Err(Error::Lex(diagnostics.into_vec()));
    }

    let document = parser::parse_tokens(&tokens, &mut diagnostics);
    if diagnostics.has_errors() {
        return Err(Error::Parse(diagnostics.into_vec()));
    }

    debug!(target: "libslz::yaml", "parser output (tree size: {})", document.dependency_tree().len());
    if enabled!(target: "libslz::yaml", Level::TRACE) {
        trace!(target: "libslz::yaml", "\n{}", encode(&document, Format::Tree));
    }

    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DependencyNode, NodeType};
    use pretty_assertions::assert_eq;

    fn ok(input: &str) -> Document {
        match parse(input, &ParseContext::default()) {
            Ok(doc) => doc,
            Err(e) => panic!("{}", e),
        }
    }

    fn errors(input: &str) -> Vec<String> {
        match parse(input, &ParseContext::default()) {
            Ok(doc) => panic!("expected an error, got {:?}", doc.root()),
            Err(e) => e.diagnostics().iter().map(|d| d.to_string()).collect(),
        }
    }

    #[test]
    fn test_nested_mapping() {
        let doc = ok("a:\n  b: 1\n  c: 2\n");
        let a = doc.root().get("a");
        assert_eq!(a.node_type(), NodeType::Object);
        assert_eq!(a.get("b").as_i64(), Some(1));
        assert_eq!(a.get("c").as_i64(), Some(2));
    }

    #[test]
    fn test_sequence_with_empty_item() {
        let doc = ok("- 1\n-\n- 3\n");
        let root = doc.root();
        assert_eq!(root.len(), 3);
        assert_eq!(root.at(0).as_i64(), Some(1));
        assert!(root.at(1).is_null());
        assert_eq!(root.at(2).as_i64(), Some(3));
    }

    #[test]
    fn test_block_literal_value() {
        let doc = ok("a: |\n  line1\n  line2\n");
        assert_eq!(doc.root().get("a").as_str(), Some("line1\nline2\n"));
    }

    #[test]
    fn test_null_root() {
        let doc = ok("null");
        assert_eq!(doc.node(Document::ROOT), Some(&DependencyNode::None(0)));
    }

    #[test]
    fn test_missing_values_are_null() {
        let doc = ok("a:\nb:\n  c:\nd: 4");
        let root = doc.root();
        assert_eq!(root.len(), 3);
        assert!(root.get("a").is_null());
        assert!(root.get("b").get("c").is_null());
        assert_eq!(root.get("d").as_i64(), Some(4));
        assert!(doc.dependency_tree().iter().all(|n| *n != DependencyNode::Pending));
    }

    #[test]
    fn test_scalar_classification() {
        let doc = ok(concat!(
            "int: -12\n",
            "float: .5\n",
            "version: 1.2.3\n",
            "word: true\n",
            "quoted: \"true\"\n",
            "single: '42'\n",
            "escaped: \"a\\tb\"\n",
            "raw: 'a\\tb'\n",
            "dot: .\n",
        ));
        let root = doc.root();
        assert_eq!(root.get("int").as_i64(), Some(-12));
        assert_eq!(root.get("float").as_f64(), Some(0.5));
        assert_eq!(root.get("version").as_str(), Some("1.2.3"));
        assert_eq!(root.get("word").as_bool(), Some(true));
        assert_ne!(root.get("word").index(), Document::TRUE);
        assert_eq!(root.get("quoted").as_str(), Some("true"));
        assert_eq!(root.get("single").as_str(), Some("42"));
        assert_eq!(root.get("escaped").as_str(), Some("a\tb"));
        assert_eq!(root.get("raw").as_str(), Some("a\\tb"));
        assert_eq!(root.get("dot").as_str(), Some("."));
    }

    #[test]
    fn test_sequence_of_mappings() {
        let doc = ok("- name: a\n  size: 1\n- name: b\n  size: 2\n");
        let root = doc.root();
        assert_eq!(root.len(), 2);
        assert_eq!(root.at(1).get("name").as_str(), Some("b"));
        assert_eq!(root.at(1).get("size").as_i64(), Some(2));
    }

    #[test]
    fn test_compact_sequence_ends_at_sibling_key() {
        let doc = ok("frames:\n- 1\n- 2\nloop: true\n");
        let root = doc.root();
        assert_eq!(root.get("frames").len(), 2);
        assert_eq!(root.get("loop").as_bool(), Some(true));
    }

    #[test]
    fn test_flow_collections() {
        let doc = ok("size: [16, 16]\nmeta: {name: mono, tags: [a, 'b c']}\nempty: {}\n");
        let root = doc.root();
        assert_eq!(root.get("size").at(1).as_i64(), Some(16));
        assert_eq!(root.get("meta").get("name").as_str(), Some("mono"));
        assert_eq!(root.get("meta").get("tags").at(1).as_str(), Some("b c"));
        assert_eq!(root.get("empty").node_type(), NodeType::Object);
        assert!(root.get("empty").is_empty());
    }

    #[test]
    fn test_flow_json_style() {
        let doc = ok(r#"{"a": [1, 2.5, null], "b":"x"}"#);
        assert_eq!(doc.root().get("a").at(1).as_f64(), Some(2.5));
        assert!(doc.root().get("a").at(2).is_null());
        assert_eq!(doc.root().get("b").as_str(), Some("x"));
    }

    #[test]
    fn test_flow_value_may_be_missing() {
        let doc = ok("{a:, b: 1}");
        assert!(doc.root().get("a").is_null());
        assert!(doc.root().lookup("a").is_some());
        assert_eq!(doc.root().get("b").as_i64(), Some(1));
    }

    #[test]
    fn test_idempotent() {
        let text = "a:\n  - x\n  - {y: 1}\nb: >\n  folded\n  text\n";
        assert_eq!(ok(text), ok(text));
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(errors("# nothing here\n\n"), vec!["Yaml Error[1, 1]: Document is empty!"]);
    }

    #[test]
    fn test_incorrect_indentation() {
        assert_eq!(
            errors("a:\n  b: 1\n   c: 2\n"),
            vec!["Yaml Error[3, 4]: Incorrect indentation!"]
        );
    }

    #[test]
    fn test_expected_list_item() {
        assert_eq!(
            errors("- a\nb: 1\n"),
            vec!["Yaml Error[2, 1]: Expected a list item for array! (found: 'b')"]
        );
    }

    #[test]
    fn test_item_on_parent_line() {
        assert_eq!(
            errors("a: - b\n"),
            vec!["Yaml Error[1, 4]: Array item can't start at the same line as the parent!"]
        );
    }

    #[test]
    fn test_inline_nested_mapping() {
        assert_eq!(
            errors("a: b: c\n"),
            vec!["Yaml Error[1, 4]: Nested mappings can't start on the same line as their key!"]
        );
    }

    #[test]
    fn test_flow_recovery_reports_each_fault() {
        assert_eq!(
            errors("['a' 'b', }]\n"),
            vec![
                "Yaml Error[1, 7]: Array items must be separated by commas! (found: 'b')",
                "Yaml Error[1, 11]: Expected a value (identifier, number, string, array, or object), found '}'",
            ]
        );
    }

    #[test]
    fn test_unclosed_flow() {
        assert_eq!(
            errors("a: {b: 1\n"),
            vec!["Yaml Error[1, 8]: Object was never closed with a }!"]
        );
    }

    #[test]
    fn test_trailing_content() {
        assert_eq!(
            errors("one\ntwo\n"),
            vec!["Yaml Error[2, 1]: End of file expected! (found: 'two')"]
        );
    }

    #[test]
    fn test_bad_escape() {
        assert_eq!(
            errors("a: \"x\\qy\"\n"),
            vec!["Yaml Error[1, 5]: Unexpected escape character! (character: '\\q')"]
        );
    }

    #[test]
    fn test_crlf_line_endings() {
        let input = "name: mono\nmetrics:\n  ascent: 7\nnote: |\n  one\n  two\nlist:\n  - a\n  - 'b'\n";
        let doc = ok(&input.replace('\n', "\r\n"));
        assert_eq!(doc, ok(input));
        assert_eq!(doc.root().get("note").as_str(), Some("one\ntwo\n"));
        assert_eq!(doc.root().get("metrics").get("ascent").as_i64(), Some(7));
    }

    #[test]
    fn test_carriage_return_in_block() {
        let doc = ok("a: |\r  x\r  y\r");
        assert_eq!(doc.root().get("a").as_str(), Some("x\ny\n"));

        let doc = ok("a: |\n  x\r  y\n");
        assert_eq!(doc.root().get("a").as_str(), Some("x\ny\n"));
    }

    #[test]
    fn test_nesting_limit() {
        assert_eq!(
            errors(&"[".repeat(100_000)),
            vec!["Yaml Error[1, 129]: Collections are nested too deeply! (limit: 128)"]
        );

        let deep: String = (0..200).map(|i| format!("{}k:\n", " ".repeat(i))).collect();
        assert_eq!(
            errors(&deep),
            vec!["Yaml Error[129, 129]: Collections are nested too deeply! (limit: 128)"]
        );
    }

    #[test]
    fn test_lex_error_wins() {
        let err = parse("a:\n\tb: 1\n", &ParseContext::default()).unwrap_err();
        assert!(matches!(err, Error::Lex(_)));
    }
}
