//! YAML rendering
//!
//! Block-style emitter over a JSON value: no anchors, aliases or flow
//! collections except the `[]` and `{}` empty markers. Each nesting level is
//! indented by two spaces.

use serde_json::Value;

const INDENT: &str = "  ";

pub fn to_yaml(value: &Value) -> String {
    render_node(value, 0)
}

fn render_node(value: &Value, depth: usize) -> String {
    let pad = INDENT.repeat(depth);
    match value {
        Value::Array(items) if !items.is_empty() => items
            .iter()
            .map(|item| {
                if is_block(item) {
                    format!("{pad}-\n{}", render_node(item, depth + 1))
                } else {
                    format!("{pad}- {}", inline(item))
                }
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(map) if !map.is_empty() => map
            .iter()
            .map(|(key, item)| {
                let key = render_key(key);
                if is_block(item) {
                    format!("{pad}{key}:\n{}", render_node(item, depth + 1))
                } else {
                    format!("{pad}{key}: {}", inline(item))
                }
            })
            .collect::<Vec<_>>()
            .join("\n"),
        _ => inline(value),
    }
}

/// Non-empty containers render as nested blocks; everything else is inline.
fn is_block(value: &Value) -> bool {
    match value {
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        _ => false,
    }
}

fn inline(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        Value::Array(_) => "[]".to_string(),
        Value::Object(_) => "{}".to_string(),
    }
}

/// Double-quoted scalar; JSON escapes are valid YAML escapes.
fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s))
}

fn render_key(key: &str) -> String {
    let plain = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if plain {
        key.to_string()
    } else {
        quote(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ParameterSchema, PromptDocument};
    use serde_json::json;

    #[test]
    fn test_empty_containers() {
        assert_eq!(to_yaml(&json!([])), "[]");
        assert_eq!(to_yaml(&json!({})), "{}");
        assert_eq!(to_yaml(&json!({ "steps": [], "meta": {} })), "steps: []\nmeta: {}");
    }

    #[test]
    fn test_scalars() {
        assert_eq!(
            to_yaml(&json!({ "a": null, "b": true, "c": 3, "d": "x: \"y\"" })),
            "a: null\nb: true\nc: 3\nd: \"x: \\\"y\\\"\""
        );
    }

    #[test]
    fn test_nesting_indents_two_spaces_per_level() {
        let yaml = to_yaml(&json!({
            "outer": {
                "inner": {
                    "leaf": "v"
                },
                "list": ["a"]
            }
        }));
        assert_eq!(
            yaml,
            "outer:\n  inner:\n    leaf: \"v\"\n  list:\n    - \"a\""
        );
    }

    #[test]
    fn test_compound_array_elements() {
        let yaml = to_yaml(&json!({
            "inputs": [{ "name": "topic", "value": "AI" }]
        }));
        assert_eq!(
            yaml,
            "inputs:\n  -\n    name: \"topic\"\n    value: \"AI\""
        );
    }

    #[test]
    fn test_document_rendering() {
        let doc = PromptDocument {
            role: "Analyst".to_string(),
            steps: vec!["Read".to_string()],
            ..Default::default()
        };
        let yaml = to_yaml(&doc.to_export_shape(ParameterSchema::Basic).to_value());
        assert_eq!(
            yaml,
            "role: \"Analyst\"\n\
             constraints: []\n\
             steps:\n  - \"Read\"\n\
             inputs: []\n\
             examples: []\n\
             parameters:\n  temperature: 0.7\n  top_p: 1.0\n  max_tokens: 1024"
        );
    }
}
