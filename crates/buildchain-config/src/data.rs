//! Payload documents for render targets.
//!
//! JSON and YAML files are accepted. In YAML, a `!text` tag marks a string
//! as block text and a `!binary` tag marks base64 content as binary data.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use buildchain_core::{Document, Mapping};
use serde_yml::Value;
use tracing::debug;

use crate::{ConfigError, ConfigResult};

/// Load a payload document, picking the parser from the file extension.
pub fn load_document(path: &Path) -> ConfigResult<Document> {
    let content = std::fs::read_to_string(path)?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let document = match extension.as_deref() {
        Some("json") => parse_json(&content)?,
        Some("yaml") | Some("yml") => parse_yaml(&content)?,
        _ => {
            return Err(ConfigError::invalid(
                "payload file",
                format!("expected a .json, .yaml or .yml file, got {}", path.display()),
            ));
        }
    };

    debug!(path = %path.display(), kind = document.kind(), "Loaded payload");
    Ok(document)
}

pub fn parse_json(text: &str) -> ConfigResult<Document> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    Ok(value.into())
}

pub fn parse_yaml(text: &str) -> ConfigResult<Document> {
    let value: Value = serde_yml::from_str(text)?;
    from_yaml(value)
}

fn from_yaml(value: Value) -> ConfigResult<Document> {
    Ok(match value {
        Value::Null => Document::Null,
        Value::Bool(b) => Document::Bool(b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Document::from(i)
            } else if let Some(u) = n.as_u64() {
                Document::from(u)
            } else {
                n.as_f64().map(Document::from).unwrap_or(Document::Null)
            }
        }
        Value::String(s) => Document::String(s),
        Value::Sequence(items) => Document::Sequence(
            items
                .into_iter()
                .map(from_yaml)
                .collect::<ConfigResult<Vec<_>>>()?,
        ),
        Value::Mapping(entries) => {
            let mut map = Mapping::new();
            for (key, value) in entries {
                map.insert(mapping_key(key)?, from_yaml(value)?);
            }
            Document::Mapping(map)
        }
        Value::Tagged(tagged) => {
            let tag = tagged.tag.to_string();
            match (tag.trim_start_matches('!'), tagged.value) {
                ("text", Value::String(s)) => Document::BlockText(s),
                ("binary", Value::String(s)) => {
                    let compact: String = s.split_whitespace().collect();
                    let bytes = STANDARD
                        .decode(compact)
                        .map_err(|e| ConfigError::invalid("!binary", e.to_string()))?;
                    Document::BinaryBlob(bytes)
                }
                (name @ ("text" | "binary"), _) => {
                    return Err(ConfigError::invalid(
                        format!("!{}", name),
                        "tag must be applied to a string",
                    ));
                }
                (other, _) => {
                    return Err(ConfigError::invalid(
                        "YAML tag",
                        format!("unsupported tag '!{}'", other),
                    ));
                }
            }
        }
    })
}

fn mapping_key(key: Value) -> ConfigResult<String> {
    match key {
        Value::String(s) => Ok(s),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(ConfigError::invalid(
            "mapping key",
            format!("keys must be scalars, got {:?}", other),
        )),
    }
}
