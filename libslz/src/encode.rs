//! Encode documents to text.
//!
//! Two renderings are provided: the indented tree dump used for tracing and
//! fixture comparison, and pretty-printed JSON. Binary and other text formats
//! are produced by the CLI tool (binslz) with dedicated libraries.

use std::fmt::Write;

use crate::document::{Document, NodeType};
use crate::value::Value;

/// Output format for encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// One line per node, nested two spaces per level
    Tree,
    /// JSON (standard, pretty-printed)
    Json,
}

/// Encode a document in the specified format.
pub fn encode(document: &Document, format: Format) -> String {
    match format {
        Format::Tree => encode_tree(document),
        Format::Json => {
            let mut out = encode_json(document.root(), 0);
            out.push('\n');
            out
        }
    }
}

// =============================================================================
// Tree Dump
// =============================================================================

fn encode_tree(document: &Document) -> String {
    let mut out = format!("PARSER OUTPUT (tree size: {})\n", document.dependency_tree().len());
    if document.has_root() {
        encode_tree_node(&mut out, document.value(Document::ROOT), 0);
    }
    out
}

fn encode_tree_node(out: &mut String, value: Value<'_>, indent: usize) {
    let pad = " ".repeat(indent);

    // Writing to a String cannot fail
    let _ = match value.node_type() {
        NodeType::String => writeln!(out, "{}String \"{}\"", pad, value.as_str().unwrap_or_default()),
        NodeType::Integer => writeln!(out, "{}Integer '{}'", pad, value.as_i64().unwrap_or_default()),
        NodeType::Float => writeln!(out, "{}Float '{:?}'", pad, value.as_f64().unwrap_or_default()),
        NodeType::Boolean => writeln!(out, "{}Boolean '{}'", pad, value.as_bool().unwrap_or_default()),
        NodeType::None => writeln!(out, "{}null", pad),
        NodeType::Array => {
            let _ = writeln!(out, "{}::Array Start::", pad);
            for item in value.items() {
                encode_tree_node(out, item, indent + 2);
            }
            writeln!(out, "{}::Array End::", pad)
        }
        NodeType::Object => {
            let _ = writeln!(out, "{}::Object Start::", pad);
            for (key, member) in value.entries() {
                let _ = writeln!(out, "{}  {}:", pad, key);
                encode_tree_node(out, member, indent + 4);
            }
            writeln!(out, "{}::Object End::", pad)
        }
    };
}

// =============================================================================
// JSON Encoder
// =============================================================================

fn encode_json(value: Value<'_>, indent: usize) -> String {
    let pad = "  ".repeat(indent);
    let pad1 = "  ".repeat(indent + 1);

    match value.node_type() {
        NodeType::None => "null".to_string(),
        NodeType::Boolean => value.as_bool().unwrap_or_default().to_string(),
        NodeType::Integer => value.as_i64().unwrap_or_default().to_string(),
        NodeType::Float => json_float(value.as_f64().unwrap_or_default()),
        NodeType::String => json_string(value.as_str().unwrap_or_default()),
        NodeType::Array => {
            if value.is_empty() {
                return "[]".to_string();
            }
            let items: Vec<String> = value
                .items()
                .map(|item| format!("{}{}", pad1, encode_json(item, indent + 1)))
                .collect();
            format!("[\n{}\n{}]", items.join(",\n"), pad)
        }
        NodeType::Object => {
            if value.is_empty() {
                return "{}".to_string();
            }
            let items: Vec<String> = value
                .entries()
                .map(|(key, member)| {
                    format!(
                        "{}{}: {}",
                        pad1,
                        json_string(key),
                        encode_json(member, indent + 1)
                    )
                })
                .collect();
            format!("{{\n{}\n{}}}", items.join(",\n"), pad)
        }
    }
}

/// JSON literal for a float; always carries a `.` or an exponent.
pub fn json_float(f: f64) -> String {
    if !f.is_finite() {
        // JSON has no NaN or Infinity
        return "null".to_string();
    }
    let s = format!("{}", f);
    if s.contains('.') || s.contains('e') {
        s
    } else {
        format!("{}.0", s)
    }
}

/// Quoted JSON string literal.
pub fn json_string(s: &str) -> String {
    let mut result = String::from("\"");
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\x08' => result.push_str("\\b"),
            '\x0c' => result.push_str("\\f"),
            c if c.is_control() => {
                let _ = write!(result, "\\u{:04x}", c as u32);
            }
            c => result.push(c),
        }
    }
    result.push('"');
    result
}
