//! CBOR transcoding: write documents as CBOR and render CBOR for review.
//!
//! Mapping from a document to CBOR:
//!   - NONE     -> CBOR null (simple value 22)
//!   - BOOLEAN  -> CBOR bool (simple values 20/21)
//!   - INTEGER  -> CBOR integer (smallest encoding that fits)
//!   - FLOAT    -> CBOR float64 (always 9 bytes, never downgraded)
//!   - STRING   -> CBOR text string (determinate length)
//!   - ARRAY    -> CBOR array (determinate length)
//!   - OBJECT   -> CBOR map (determinate length, text keys, member order)

use anyhow::{bail, Context, Result};
use ciborium::value::Value as CborValue;
use libslz::{json_float, json_string, Document, NodeType, Value};

// ---------------------------------------------------------------------------
// Encode (document -> CBOR)
//
// Bytes are written directly rather than through ciborium's Value type,
// which shortens floats to float16/float32 when they fit.
// ---------------------------------------------------------------------------

/// Encode a document as CBOR bytes.
pub fn encode(document: &Document) -> Vec<u8> {
    let mut buf = Vec::new();
    write_value(&mut buf, document.root());
    buf
}

fn write_value(buf: &mut Vec<u8>, value: Value<'_>) {
    match value.node_type() {
        NodeType::None => buf.push(0xf6),
        NodeType::Boolean => buf.push(if value.as_bool() == Some(true) { 0xf5 } else { 0xf4 }),
        NodeType::Integer => write_integer(buf, value.as_i64().unwrap_or_default()),
        NodeType::Float => {
            // major 7, info 27
            buf.push(0xfb);
            buf.extend_from_slice(&value.as_f64().unwrap_or_default().to_be_bytes());
        }
        NodeType::String => write_text(buf, value.as_str().unwrap_or_default()),
        NodeType::Array => {
            write_type_and_length(buf, 4, value.len() as u64);
            for item in value.items() {
                write_value(buf, item);
            }
        }
        NodeType::Object => {
            write_type_and_length(buf, 5, value.len() as u64);
            for (key, member) in value.entries() {
                write_text(buf, key);
                write_value(buf, member);
            }
        }
    }
}

fn write_text(buf: &mut Vec<u8>, s: &str) {
    write_type_and_length(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

/// Write a CBOR major type + length/value argument.
///
/// The major type sits in the high 3 bits. Arguments 0-23 fit in the low 5
/// bits; 24, 25, 26 and 27 announce a 1, 2, 4 or 8 byte argument.
fn write_type_and_length(buf: &mut Vec<u8>, major: u8, val: u64) {
    let high = major << 5;
    match val {
        0..=23 => buf.push(high | val as u8),
        24..=0xff => {
            buf.push(high | 24);
            buf.push(val as u8);
        }
        0x100..=0xffff => {
            buf.push(high | 25);
            buf.extend_from_slice(&(val as u16).to_be_bytes());
        }
        0x10000..=0xffff_ffff => {
            buf.push(high | 26);
            buf.extend_from_slice(&(val as u32).to_be_bytes());
        }
        _ => {
            buf.push(high | 27);
            buf.extend_from_slice(&val.to_be_bytes());
        }
    }
}

/// Major 0 carries n; major 1 carries -1 - n.
fn write_integer(buf: &mut Vec<u8>, n: i64) {
    if n < 0 {
        write_type_and_length(buf, 1, !(n as u64));
    } else {
        write_type_and_length(buf, 0, n as u64);
    }
}

// ---------------------------------------------------------------------------
// Diagnostic Notation (CBOR -> human-readable text, RFC 8949 §8)
// ---------------------------------------------------------------------------

/// Render CBOR bytes written by [`encode`] as diagnostic notation.
///
/// The bytes are decoded again, so the text shows what a CBOR reader sees.
/// Short arrays of scalars stay on one line.
pub fn diagnostic(input: &[u8]) -> Result<String> {
    let value: CborValue = ciborium::de::from_reader(input).context("CBOR decode error")?;
    let mut out = render(&value, 0)?;
    out.push('\n');
    Ok(out)
}

fn render(value: &CborValue, indent: usize) -> Result<String> {
    let pad = "  ".repeat(indent);
    let pad1 = "  ".repeat(indent + 1);

    Ok(match value {
        CborValue::Null => "null".to_string(),
        CborValue::Bool(b) => b.to_string(),
        CborValue::Integer(n) => i128::from(*n).to_string(),
        CborValue::Float(f) => json_float(*f),
        CborValue::Text(s) => json_string(s),
        CborValue::Array(items) if items.is_empty() => "[]".to_string(),
        CborValue::Array(items) if items.len() <= 5 && items.iter().all(is_scalar) => {
            let items = items
                .iter()
                .map(|item| render(item, indent))
                .collect::<Result<Vec<_>>>()?;
            format!("[{}]", items.join(", "))
        }
        CborValue::Array(items) => {
            let items = items
                .iter()
                .map(|item| Ok(format!("{}{}", pad1, render(item, indent + 1)?)))
                .collect::<Result<Vec<_>>>()?;
            format!("[\n{}\n{}]", items.join(",\n"), pad)
        }
        CborValue::Map(pairs) if pairs.is_empty() => "{}".to_string(),
        CborValue::Map(pairs) => {
            let members = pairs
                .iter()
                .map(|(key, member)| {
                    Ok(format!("{}{}: {}", pad1, render(key, indent + 1)?, render(member, indent + 1)?))
                })
                .collect::<Result<Vec<_>>>()?;
            format!("{{\n{}\n{}}}", members.join(",\n"), pad)
        }
        other => bail!("unexpected CBOR item in document output: {:?}", other),
    })
}

fn is_scalar(value: &CborValue) -> bool {
    !matches!(value, CborValue::Array(_) | CborValue::Map(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use libslz::parse_json;

    #[test]
    fn test_scalars() {
        assert_eq!(encode(&parse_json("null").unwrap()), vec![0xf6]);
        assert_eq!(encode(&parse_json("true").unwrap()), vec![0xf5]);
        assert_eq!(encode(&parse_json("10").unwrap()), vec![0x0a]);
        assert_eq!(encode(&parse_json("500").unwrap()), vec![0x19, 0x01, 0xf4]);
        assert_eq!(encode(&parse_json("-1").unwrap()), vec![0x20]);
        assert_eq!(encode(&parse_json("-100").unwrap()), vec![0x38, 0x63]);
        assert_eq!(encode(&parse_json("\"a\"").unwrap()), vec![0x61, b'a']);
    }

    #[test]
    fn test_float_stays_wide() {
        let bytes = encode(&parse_json("1.5").unwrap());
        assert_eq!(bytes.len(), 9);
        assert_eq!(bytes[0], 0xfb);
    }

    #[test]
    fn test_extreme_integers() {
        let bytes = encode(&parse_json("-9223372036854775808").unwrap());
        assert_eq!(bytes, vec![0x3b, 0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
        let back: CborValue = ciborium::de::from_reader(bytes.as_slice()).unwrap();
        assert_eq!(back, CborValue::Integer(i64::MIN.into()));
    }

    #[test]
    fn test_diagnostic_keeps_member_order() {
        let doc = parse_json(r#"{"w": 6, "h": 8.0, "tags": ["a", null]}"#).unwrap();
        let text = diagnostic(&encode(&doc)).unwrap();
        assert_eq!(text, "{\n  \"w\": 6,\n  \"h\": 8.0,\n  \"tags\": [\"a\", null]\n}\n");
    }

    #[test]
    fn test_diagnostic_nesting() {
        let doc = parse_json(r#"[[1, 2], {}, [], "q\"", -7, 0.5]"#).unwrap();
        let text = diagnostic(&encode(&doc)).unwrap();
        assert_eq!(
            text,
            "[\n  [1, 2],\n  {},\n  [],\n  \"q\\\"\",\n  -7,\n  0.5\n]\n"
        );
    }

    #[test]
    fn test_diagnostic_rejects_foreign_items() {
        // h'01', a byte string
        assert!(diagnostic(&[0x41, 0x01]).is_err());
        // truncated array
        assert!(diagnostic(&[0x82, 0x01]).is_err());
    }
}
