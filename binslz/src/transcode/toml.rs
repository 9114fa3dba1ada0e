//! TOML transcoding: render documents as TOML text.
//!
//! Mapping from a document to TOML:
//!   - NONE     -> error (TOML has no null)
//!   - BOOLEAN  -> TOML boolean
//!   - INTEGER  -> TOML integer
//!   - FLOAT    -> TOML float
//!   - STRING   -> TOML string
//!   - ARRAY    -> TOML array (objects inside become inline tables)
//!   - OBJECT   -> TOML table
//!
//! TOML requires the top-level value to be a table; any other root errors.

use anyhow::{bail, Result};
use libslz::{Document, NodeType, Value};
use toml_edit::{Array, DocumentMut, Formatted, InlineTable, Item, Table};

/// Encode a document as a TOML string.
pub fn encode(document: &Document) -> Result<String> {
    let root = document.root();
    if root.node_type() != NodeType::Object {
        bail!("TOML requires the top-level value to be a table/object");
    }

    let mut doc = DocumentMut::new();
    for (key, member) in root.entries() {
        doc[key] = value_to_item(member, key)?;
    }
    Ok(doc.to_string())
}

fn value_to_item(value: Value<'_>, path: &str) -> Result<Item> {
    match value.node_type() {
        NodeType::Object => {
            let mut table = Table::new();
            for (key, member) in value.entries() {
                table.insert(key, value_to_item(member, &format!("{}.{}", path, key))?);
            }
            Ok(Item::Table(table))
        }
        _ => Ok(Item::Value(value_to_toml(value, path)?)),
    }
}

fn value_to_toml(value: Value<'_>, path: &str) -> Result<toml_edit::Value> {
    Ok(match value.node_type() {
        NodeType::None => bail!("TOML has no null type (at {})", path),
        NodeType::Boolean => toml_edit::Value::Boolean(Formatted::new(value.as_bool().unwrap_or_default())),
        NodeType::Integer => toml_edit::Value::Integer(Formatted::new(value.as_i64().unwrap_or_default())),
        NodeType::Float => toml_edit::Value::Float(Formatted::new(value.as_f64().unwrap_or_default())),
        NodeType::String => {
            toml_edit::Value::String(Formatted::new(value.as_str().unwrap_or_default().to_string()))
        }
        NodeType::Array => {
            let mut array = Array::new();
            for (i, item) in value.items().enumerate() {
                array.push(value_to_toml(item, &format!("{}[{}]", path, i))?);
            }
            toml_edit::Value::Array(array)
        }
        NodeType::Object => {
            let mut inline = InlineTable::new();
            for (key, member) in value.entries() {
                inline.insert(key, value_to_toml(member, &format!("{}.{}", path, key))?);
            }
            toml_edit::Value::InlineTable(inline)
        }
    })
}
