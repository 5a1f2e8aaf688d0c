//! Env file renderer: one `KEY=VALUE` line per entry, in insertion order.
//!
//! No quoting or escaping happens here; callers supply values that are
//! already safe for the consumer of the file.

use base64::engine::general_purpose::STANDARD;
use buildchain_core::{Document, Error, RenderError, RenderResult, Result};

pub fn render(doc: &Document) -> RenderResult<String> {
    let map = doc.as_mapping().ok_or_else(|| {
        RenderError::Payload(format!("env file needs a mapping, got {}", doc.kind()))
    })?;

    let lines = map
        .iter()
        .map(|(key, value)| {
            scalar_value(value)
                .map(|v| format!("{}={}", key, v))
                .ok_or_else(|| {
                    RenderError::Payload(format!("value of '{}' is a {}", key, value.kind()))
                })
        })
        .collect::<RenderResult<Vec<_>>>()?;

    let mut out = lines.join("\n");
    out.push('\n');
    Ok(out)
}

/// Reject documents the env renderer cannot express.
pub fn check(doc: &Document) -> Result<()> {
    let unsupported = |reason: String| Error::UnsupportedPayload {
        format: "ENV".to_string(),
        reason,
    };

    let map = doc
        .as_mapping()
        .ok_or_else(|| unsupported(format!("expected a mapping, got {}", doc.kind())))?;
    for (key, value) in map {
        if !value.is_scalar() {
            return Err(unsupported(format!(
                "value of '{}' is a {}",
                key,
                value.kind()
            )));
        }
    }
    Ok(())
}

fn scalar_value(value: &Document) -> Option<String> {
    match value {
        Document::Null => Some(String::new()),
        Document::Bool(b) => Some(b.to_string()),
        Document::Number(n) => Some(n.to_string()),
        Document::String(s) | Document::BlockText(s) => Some(s.clone()),
        Document::BinaryBlob(bytes) => Some(base64::Engine::encode(&STANDARD, bytes)),
        Document::Sequence(_) | Document::Mapping(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_preserved() {
        let doc = Document::mapping([("B", "2"), ("A", "1")]);
        assert_eq!(render(&doc).unwrap(), "B=2\nA=1\n");
    }

    #[test]
    fn test_scalars_rendered_verbatim() {
        let doc = Document::mapping([
            ("PORT", Document::from(8080i64)),
            ("DEBUG", Document::from(false)),
            ("EMPTY", Document::Null),
            ("SPACED", Document::from("a b \"c\"")),
        ]);
        assert_eq!(
            render(&doc).unwrap(),
            "PORT=8080\nDEBUG=false\nEMPTY=\nSPACED=a b \"c\"\n"
        );
    }

    #[test]
    fn test_empty_mapping_is_single_newline() {
        assert_eq!(render(&Document::Mapping(Default::default())).unwrap(), "\n");
    }

    #[test]
    fn test_nested_values_rejected() {
        let doc = Document::mapping([("LIST", Document::from(vec!["a"]))]);
        assert!(matches!(render(&doc), Err(RenderError::Payload(_))));
        assert!(check(&doc).is_err());
        assert!(check(&Document::from("flat")).is_err());
        assert!(check(&Document::mapping([("K", "v")])).is_ok());
    }
}
