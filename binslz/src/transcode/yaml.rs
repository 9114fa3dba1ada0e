//! YAML transcoding: render documents as YAML text.
//!
//! Mapping from a document to YAML:
//!   - NONE     -> YAML null
//!   - BOOLEAN  -> YAML bool
//!   - INTEGER  -> YAML integer
//!   - FLOAT    -> YAML float
//!   - STRING   -> YAML string
//!   - ARRAY    -> YAML sequence
//!   - OBJECT   -> YAML mapping (member order kept)

use anyhow::{Context, Result};
use libslz::{Document, NodeType, Value};

/// Encode a document as a YAML string.
pub fn encode(document: &Document) -> Result<String> {
    let yaml_value = value_to_yaml(document.root());
    serde_yaml::to_string(&yaml_value).context("YAML encode error")
}

fn value_to_yaml(value: Value<'_>) -> serde_yaml::Value {
    match value.node_type() {
        NodeType::None => serde_yaml::Value::Null,
        NodeType::Boolean => serde_yaml::Value::Bool(value.as_bool().unwrap_or_default()),
        NodeType::Integer => {
            serde_yaml::Value::Number(serde_yaml::Number::from(value.as_i64().unwrap_or_default()))
        }
        NodeType::Float => {
            serde_yaml::Value::Number(serde_yaml::Number::from(value.as_f64().unwrap_or_default()))
        }
        NodeType::String => serde_yaml::Value::String(value.as_str().unwrap_or_default().to_string()),
        NodeType::Array => serde_yaml::Value::Sequence(value.items().map(value_to_yaml).collect()),
        NodeType::Object => {
            let mut map = serde_yaml::Mapping::new();
            for (key, member) in value.entries() {
                map.insert(serde_yaml::Value::String(key.to_string()), value_to_yaml(member));
            }
            serde_yaml::Value::Mapping(map)
        }
    }
}
