//! Reading documents the way an application would: through `Value`, without
//! caring which grammar produced them.

use libslz::{parse, Document, NodeType, Syntax};

const FONT_JSON: &str = r#"{
  "name": "mono",
  "size": 8,
  "lineHeight": 1.25,
  "glyphs": [
    {"char": "A", "advance": 6},
    {"char": "g", "advance": 6, "descent": -2}
  ]
}"#;

const FONT_YAML: &str = "\
name: mono
size: 8
lineHeight: 1.25
glyphs:
  - char: A
    advance: 6
  - char: g
    advance: 6
    descent: -2
";

#[derive(Debug, PartialEq)]
struct Glyph {
    ch: String,
    advance: i64,
    descent: i64,
}

fn glyphs(document: &Document) -> Vec<Glyph> {
    document
        .root()
        .get("glyphs")
        .items()
        .map(|g| Glyph {
            ch: g.get("char").as_str().unwrap_or_default().to_string(),
            advance: g.get("advance").as_i64().unwrap_or_default(),
            descent: g.get("descent").as_i64().unwrap_or_default(),
        })
        .collect()
}

#[test]
fn test_font_reads_the_same_from_both_grammars() {
    let from_json = parse(FONT_JSON, Syntax::Json).unwrap();
    let from_yaml = parse(FONT_YAML, Syntax::Yaml).unwrap();

    let expected = vec![
        Glyph { ch: "A".into(), advance: 6, descent: 0 },
        Glyph { ch: "g".into(), advance: 6, descent: -2 },
    ];
    assert_eq!(glyphs(&from_json), expected);
    assert_eq!(glyphs(&from_yaml), expected);
    assert_eq!(from_json.root(), from_yaml.root());
}

#[test]
fn test_missing_members_read_as_null() {
    let document = parse(FONT_JSON, Syntax::Json).unwrap();
    let font = document.root();

    assert!(font.get("kerning").is_null());
    assert!(font.get("glyphs").at(5).is_null());
    assert!(font.get("size").get("anything").is_null());
    assert_eq!(font.get("kerning").len(), 0);
    assert_eq!(font.get("size").items().count(), 0);
}

#[test]
fn test_number_kinds() {
    let document = parse(FONT_YAML, Syntax::Yaml).unwrap();
    let font = document.root();

    assert_eq!(font.get("size").node_type(), NodeType::Integer);
    assert_eq!(font.get("size").as_f64(), Some(8.0));
    assert_eq!(font.get("lineHeight").node_type(), NodeType::Float);
    assert_eq!(font.get("lineHeight").as_i64(), None);
    assert_eq!(font.get("name").as_i64(), None);
}

#[test]
fn test_member_order_is_kept() {
    let document = parse(FONT_YAML, Syntax::Yaml).unwrap();
    let keys: Vec<&str> = document.root().entries().map(|(k, _)| k).collect();
    assert_eq!(keys, ["name", "size", "lineHeight", "glyphs"]);
}
