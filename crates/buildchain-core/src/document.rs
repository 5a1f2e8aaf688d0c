//! Document values and output formats.
//!
//! A [`Document`] is the in-memory form of anything a target renders to disk.
//! Most variants are plain structured data; [`Document::BlockText`] and
//! [`Document::BinaryBlob`] additionally carry a rendering intent that every
//! renderer honors (formats without literal blocks degrade them to strings).

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::Error;

/// Insertion-ordered mapping used by [`Document::Mapping`].
pub type Mapping = IndexMap<String, Document>;

/// A renderable value.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Sequence(Vec<Document>),
    Mapping(Mapping),
    /// Text rendered as a literal block scalar, line breaks kept verbatim.
    BlockText(String),
    /// Bytes rendered as base64 text inside a literal block scalar.
    BinaryBlob(Vec<u8>),
}

impl Document {
    /// Wrap text that must render as a literal block.
    pub fn text(value: impl Into<String>) -> Self {
        Document::BlockText(value.into())
    }

    /// Wrap bytes that must render as base64-encoded text.
    pub fn binary(value: impl Into<Vec<u8>>) -> Self {
        Document::BinaryBlob(value.into())
    }

    /// Build a mapping, keeping the iteration order of `entries`.
    pub fn mapping<K, V, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Document>,
    {
        Document::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Whether this value renders as a single scalar.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Document::Sequence(_) | Document::Mapping(_))
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Document::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Document]> {
        match self {
            Document::Sequence(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the text of a `String` or `BlockText` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Document::String(s) | Document::BlockText(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Document::Null => "null",
            Document::Bool(_) => "bool",
            Document::Number(_) => "number",
            Document::String(_) => "string",
            Document::Sequence(_) => "sequence",
            Document::Mapping(_) => "mapping",
            Document::BlockText(_) => "block text",
            Document::BinaryBlob(_) => "binary blob",
        }
    }
}

impl From<&str> for Document {
    fn from(value: &str) -> Self {
        Document::String(value.to_string())
    }
}

impl From<String> for Document {
    fn from(value: String) -> Self {
        Document::String(value)
    }
}

impl From<bool> for Document {
    fn from(value: bool) -> Self {
        Document::Bool(value)
    }
}

impl From<i64> for Document {
    fn from(value: i64) -> Self {
        Document::Number(value.into())
    }
}

impl From<u64> for Document {
    fn from(value: u64) -> Self {
        Document::Number(value.into())
    }
}

impl From<i32> for Document {
    fn from(value: i32) -> Self {
        Document::Number(value.into())
    }
}

impl From<u32> for Document {
    fn from(value: u32) -> Self {
        Document::Number(value.into())
    }
}

impl From<f64> for Document {
    /// Non-finite floats have no portable encoding and become `Null`.
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map(Document::Number)
            .unwrap_or(Document::Null)
    }
}

impl<T: Into<Document>> From<Vec<T>> for Document {
    fn from(value: Vec<T>) -> Self {
        Document::Sequence(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Document>> From<Option<T>> for Document {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Document::Null)
    }
}

impl From<Mapping> for Document {
    fn from(value: Mapping) -> Self {
        Document::Mapping(value)
    }
}

impl From<serde_json::Value> for Document {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Document::Null,
            serde_json::Value::Bool(b) => Document::Bool(b),
            serde_json::Value::Number(n) => Document::Number(n),
            serde_json::Value::String(s) => Document::String(s),
            serde_json::Value::Array(items) => {
                Document::Sequence(items.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(map) => {
                Document::Mapping(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

/// Supported on-disk output formats. Each has exactly one renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Json,
    Env,
    Yaml,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Json, Format::Env, Format::Yaml];

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Json => "JSON",
            Format::Env => "ENV",
            Format::Yaml => "YAML",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "env" => Ok(Format::Env),
            "yaml" | "yml" => Ok(Format::Yaml),
            _ => Err(Error::invalid(
                "format",
                format!(
                    "unknown format '{}', expected one of: {}",
                    s,
                    Format::ALL.map(|f| f.as_str()).join(", ")
                ),
            )),
        }
    }
}
