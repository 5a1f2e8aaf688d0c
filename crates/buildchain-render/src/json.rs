//! JSON renderer: keys sorted at every level, 2-space indentation.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use buildchain_core::{Document, RenderResult};
use serde_json::{Map, Value};

pub fn render(doc: &Document) -> RenderResult<String> {
    let mut out = serde_json::to_string_pretty(&to_json_value(doc))?;
    out.push('\n');
    Ok(out)
}

/// Convert a document to JSON, degrading block text and binary blobs to
/// strings (binary as unwrapped base64).
pub fn to_json_value(doc: &Document) -> Value {
    match doc {
        Document::Null => Value::Null,
        Document::Bool(b) => Value::Bool(*b),
        Document::Number(n) => Value::Number(n.clone()),
        Document::String(s) | Document::BlockText(s) => Value::String(s.clone()),
        Document::BinaryBlob(bytes) => Value::String(base64::Engine::encode(&STANDARD, bytes)),
        Document::Sequence(items) => Value::Array(items.iter().map(to_json_value).collect()),
        Document::Mapping(map) => {
            // Sort explicitly so the output does not depend on whether
            // serde_json keeps insertion order.
            let sorted: BTreeMap<&String, &Document> = map.iter().collect();
            let mut object = Map::new();
            for (key, value) in sorted {
                object.insert(key.clone(), to_json_value(value));
            }
            Value::Object(object)
        }
    }
}
