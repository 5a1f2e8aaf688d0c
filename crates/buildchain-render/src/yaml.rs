//! YAML renderer.
//!
//! Emits block-style YAML with mapping keys in insertion order.
//! [`Document::BlockText`] renders as a literal block scalar (`|`) with its
//! line breaks kept verbatim; [`Document::BinaryBlob`] is base64-encoded
//! (76-character lines) and rendered the same way. Plain strings stay
//! unquoted only when they cannot be mistaken for another YAML type.

use base64::engine::general_purpose::STANDARD;
use buildchain_core::{Document, Mapping};

const INDENT: usize = 2;
const BASE64_LINE_WIDTH: usize = 76;
/// Longest key YAML accepts in the implicit `key: value` form.
const MAX_IMPLICIT_KEY: usize = 1024;

/// Words that YAML 1.1 or 1.2 resolve to null or booleans.
const RESERVED: &[&str] = &[
    "null", "~", "true", "false", "yes", "no", "on", "off", "y", "n",
];

pub fn render(doc: &Document) -> String {
    let mut out = String::new();
    match doc {
        Document::Mapping(map) if !map.is_empty() => write_mapping(&mut out, map, 0, false),
        Document::Sequence(items) if !items.is_empty() => {
            write_sequence(&mut out, items, 0, false)
        }
        _ => write_scalar(&mut out, doc, 0),
    }
    out
}

fn write_mapping(out: &mut String, map: &Mapping, indent: usize, inline_first: bool) {
    for (i, (key, value)) in map.iter().enumerate() {
        if i > 0 || !inline_first {
            pad(out, indent);
        }
        let key = scalar_string(key);
        let explicit = key.len() > MAX_IMPLICIT_KEY;
        if explicit {
            out.push_str("? ");
            out.push_str(&key);
            out.push('\n');
            pad(out, indent);
        } else {
            out.push_str(&key);
        }
        out.push(':');
        match value {
            Document::Mapping(m) if !m.is_empty() => {
                out.push('\n');
                write_mapping(out, m, indent + INDENT, false);
            }
            Document::Sequence(items) if !items.is_empty() => {
                out.push('\n');
                let indent = if explicit { indent + INDENT } else { indent };
                write_sequence(out, items, indent, false);
            }
            _ => {
                out.push(' ');
                write_scalar(out, value, indent);
            }
        }
    }
}

fn write_sequence(out: &mut String, items: &[Document], indent: usize, inline_first: bool) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 || !inline_first {
            pad(out, indent);
        }
        out.push_str("- ");
        match item {
            Document::Mapping(m) if !m.is_empty() => write_mapping(out, m, indent + INDENT, true),
            Document::Sequence(s) if !s.is_empty() => {
                write_sequence(out, s, indent + INDENT, true)
            }
            _ => write_scalar(out, item, indent),
        }
    }
}

/// Write a value that fits on the current line (literal blocks continue on
/// the following lines, indented one level deeper than `indent`).
fn write_scalar(out: &mut String, value: &Document, indent: usize) {
    match value {
        Document::Null => out.push_str("null"),
        Document::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Document::Number(n) => out.push_str(&n.to_string()),
        Document::String(s) => out.push_str(&scalar_string(s)),
        Document::Mapping(_) => out.push_str("{}"),
        Document::Sequence(_) => out.push_str("[]"),
        Document::BlockText(text) => return write_literal(out, text, indent),
        Document::BinaryBlob(bytes) => return write_literal(out, &base64_lines(bytes), indent),
    }
    out.push('\n');
}

fn write_literal(out: &mut String, text: &str, indent: usize) {
    if !literal_safe(text) {
        out.push_str(&double_quoted(text));
        out.push('\n');
        return;
    }

    let (body, chomping) = match text.strip_suffix('\n') {
        None => (text, "-"),
        Some(rest) if rest.is_empty() || rest.ends_with('\n') => (rest, "+"),
        Some(rest) => (rest, ""),
    };

    // Leading whitespace on the first content line would be taken as
    // indentation, and a leading tab is rejected outright.
    let needs_indicator = body
        .split('\n')
        .find(|line| !line.is_empty())
        .is_some_and(|line| line.starts_with([' ', '\t']));

    out.push('|');
    if needs_indicator {
        out.push_str(&INDENT.to_string());
    }
    out.push_str(chomping);
    out.push('\n');

    if text.is_empty() {
        return;
    }
    for line in body.split('\n') {
        if !line.is_empty() {
            pad(out, indent + INDENT);
            out.push_str(line);
        }
        out.push('\n');
    }
}

/// Characters a literal block cannot carry verbatim.
fn literal_safe(text: &str) -> bool {
    text.chars().all(|c| {
        c == '\n'
            || c == '\t'
            || !(c.is_control() || matches!(c, '\u{2028}' | '\u{2029}' | '\u{feff}'))
    })
}

fn base64_lines(bytes: &[u8]) -> String {
    let encoded = base64::Engine::encode(&STANDARD, bytes);
    let mut out = String::with_capacity(encoded.len() + encoded.len() / BASE64_LINE_WIDTH + 1);
    for (i, c) in encoded.chars().enumerate() {
        if i > 0 && i % BASE64_LINE_WIDTH == 0 {
            out.push('\n');
        }
        out.push(c);
    }
    if !encoded.is_empty() {
        out.push('\n');
    }
    out
}

fn scalar_string(s: &str) -> String {
    if is_plain_safe(s) {
        s.to_string()
    } else {
        double_quoted(s)
    }
}

/// Conservative check for strings that read back as the same string when
/// left unquoted in block context.
fn is_plain_safe(s: &str) -> bool {
    let Some(first) = s.chars().next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_' || first == '/') {
        return false;
    }
    if s.ends_with(' ') || RESERVED.contains(&s.to_ascii_lowercase().as_str()) {
        return false;
    }
    s.chars().all(|c| {
        c.is_ascii_alphanumeric()
            || matches!(c, ' ' | '_' | '-' | '.' | '/' | ',' | '(' | ')' | '+' | '=' | '*')
    })
}

fn double_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() || matches!(c, '\u{2028}' | '\u{2029}' | '\u{feff}') => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn pad(out: &mut String, indent: usize) {
    out.extend(std::iter::repeat_n(' ', indent));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yml::Value;

    fn parse(text: &str) -> Value {
        serde_yml::from_str(text).unwrap()
    }

    #[test]
    fn test_block_layout() {
        let doc = Document::mapping([
            ("name", Document::from("pre-merge")),
            (
                "worker",
                Document::mapping([("type", "pod"), ("manifest_path", "eve/pod.yaml")]),
            ),
            ("branches", Document::from(vec!["user/*", "feature/*"])),
            (
                "steps",
                Document::from(vec![Document::mapping([
                    ("type", Document::from("trigger_stages")),
                    ("stages", Document::Sequence(vec![])),
                ])]),
            ),
        ]);
        let expected = "\
name: pre-merge
worker:
  type: pod
  manifest_path: eve/pod.yaml
branches:
- user/*
- feature/*
steps:
- type: trigger_stages
  stages: []
";
        assert_eq!(render(&doc), expected);
    }

    #[test]
    fn test_block_text_is_literal() {
        let script = "#!/bin/bash\nset -e\n\necho \"done: 100%\"\n";
        let doc = Document::mapping([("script", Document::text(script))]);
        let out = render(&doc);
        assert!(out.starts_with("script: |\n  #!/bin/bash\n"), "{}", out);
        assert_eq!(parse(&out)["script"].as_str(), Some(script));
    }

    #[test]
    fn test_block_text_chomping() {
        for text in [
            "no newline",
            "one\n",
            "kept\n\n\n",
            "",
            "  indented\nnext",
            "\tcp a b\n\tcp c d\n",
            "\n\tafter blank\n",
        ] {
            let doc = Document::mapping([("t", Document::text(text)), ("after", "x".into())]);
            let parsed = parse(&render(&doc));
            assert_eq!(parsed["t"].as_str(), Some(text), "text {:?}", text);
            assert_eq!(parsed["after"].as_str(), Some("x"));
        }
    }

    #[test]
    fn test_block_text_in_nested_sequence() {
        let doc = Document::from(vec![Document::mapping([(
            "items",
            Document::from(vec![Document::text("a\nb\n")]),
        )])]);
        let parsed = parse(&render(&doc));
        assert_eq!(parsed[0]["items"][0].as_str(), Some("a\nb\n"));
    }

    #[test]
    fn test_binary_blob_round_trip() {
        let bytes: Vec<u8> = (0u8..=255).cycle().take(300).collect();
        let doc = Document::mapping([("ca.key", Document::binary(bytes.clone()))]);
        let out = render(&doc);
        assert!(out.starts_with("ca.key: |\n"));

        let parsed = parse(&out);
        let encoded: String = parsed["ca.key"]
            .as_str()
            .unwrap()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let decoded = base64::Engine::decode(&STANDARD, encoded).unwrap();
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn test_ambiguous_strings_are_quoted() {
        let values = ["yes", "No", "null", "123", "1.5", "", " lead", "a: b", "#x", "-1", "@at"];
        let doc = Document::mapping(values.iter().map(|v| (v.to_string(), Document::from(*v))));
        let parsed = parse(&render(&doc));
        for v in values {
            assert_eq!(parsed[v].as_str(), Some(v), "value {:?}", v);
        }
    }

    #[test]
    fn test_scalars() {
        let doc = Document::mapping([
            ("count", Document::from(3i64)),
            ("enabled", Document::from(true)),
            ("missing", Document::Null),
            ("empty", Document::Mapping(Default::default())),
        ]);
        assert_eq!(
            render(&doc),
            "count: 3\nenabled: true\nmissing: null\nempty: {}\n"
        );
    }

    #[test]
    fn test_nested_sequences() {
        let doc = Document::from(vec![
            Document::from(vec!["a", "b"]),
            Document::from(vec!["c"]),
        ]);
        let out = render(&doc);
        assert_eq!(out, "- - a\n  - b\n- - c\n");
        let parsed = parse(&out);
        assert_eq!(parsed[0][1].as_str(), Some("b"));
    }

    #[test]
    fn test_tab_indented_block_text_in_sequence() {
        let recipe = "\tgo build ./...\n\tgo test ./...\n";
        let doc = Document::mapping([(
            "targets",
            Document::from(vec![Document::mapping([("recipe", Document::text(recipe))])]),
        )]);
        let out = render(&doc);
        assert!(out.contains("recipe: |2\n"), "{}", out);
        assert_eq!(parse(&out)["targets"][0]["recipe"].as_str(), Some(recipe));
    }

    #[test]
    fn test_long_keys_use_explicit_form() {
        let long = "k".repeat(1100);
        let quoted = format!("{} \"quoted\"", "q".repeat(1030));
        let doc = Document::mapping([
            (long.clone(), Document::from("v")),
            (
                quoted.clone(),
                Document::from(vec![Document::mapping([("a", 1i64), ("b", 2i64)])]),
            ),
            (
                "nested".to_string(),
                Document::mapping([(long.clone(), Document::mapping([("c", "d")]))]),
            ),
            ("short".to_string(), Document::from("s")),
        ]);
        let out = render(&doc);
        assert!(out.starts_with(&format!("? {}\n: v\n", long)), "{}", out);

        let parsed = parse(&out);
        assert_eq!(parsed[long.as_str()].as_str(), Some("v"));
        assert_eq!(parsed[quoted.as_str()][0]["b"].as_i64(), Some(2));
        assert_eq!(parsed["nested"][long.as_str()]["c"].as_str(), Some("d"));
        assert_eq!(parsed["short"].as_str(), Some("s"));
    }

    #[test]
    fn test_control_characters_fall_back_to_quoted() {
        let text = "bell\u{7}\r\n";
        let doc = Document::mapping([("t", Document::text(text))]);
        assert_eq!(parse(&render(&doc))["t"].as_str(), Some(text));
    }
}
