//! Schema normalization
//!
//! Turns an arbitrary JSON value (an import file or a library snapshot) into
//! a fully-defaulted [`PromptDocument`]. Missing keys default, unknown keys
//! are ignored, and wrong-typed values fall back to their defaults. The only
//! rejected input is a top-level value that is not an object.

use serde_json::{Map, Value};

use super::entities::{InputPair, Parameters, PromptDocument};
use super::errors::DomainError;

impl PromptDocument {
    /// Rebuild an editable document from an imported or stored shape
    pub fn from_imported(value: &Value) -> Result<Self, DomainError> {
        let object = value.as_object().ok_or_else(|| {
            DomainError::Validation(format!(
                "expected a JSON object, found {}",
                json_kind(value)
            ))
        })?;

        Ok(Self {
            title: text(object, "title"),
            role: text(object, "role"),
            task: text(object, "task"),
            audience: text(object, "audience"),
            style: text(object, "style"),
            tone: text(object, "tone"),
            constraints: text_list(object, "constraints"),
            steps: text_list(object, "steps"),
            inputs: input_lines(object),
            examples: text_list(object, "examples"),
            parameters: parameters(object.get("parameters")),
        })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn text(object: &Map<String, Value>, key: &str) -> String {
    object
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn text_list(object: &Map<String, Value>, key: &str) -> Vec<String> {
    object
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Inputs arrive either as `{name, value}` objects or as raw lines.
fn input_lines(object: &Map<String, Value>) -> Vec<String> {
    let Some(items) = object.get("inputs").and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(line) => Some(line.clone()),
            Value::Object(pair) => {
                let name = text(pair, "name");
                let value = text(pair, "value");
                if name.is_empty() && !value.is_empty() {
                    // Keep the value reachable through the first-colon split.
                    Some(format!(": {}", value))
                } else {
                    Some(InputPair { name, value }.to_line())
                }
            }
            _ => None,
        })
        .collect()
}

fn parameters(value: Option<&Value>) -> Parameters {
    let defaults = Parameters::default();
    let Some(object) = value.and_then(Value::as_object) else {
        return defaults;
    };

    let float = |key: &str, default: f64| {
        object
            .get(key)
            .and_then(Value::as_f64)
            .filter(|n| n.is_finite())
            .unwrap_or(default)
    };

    let max_tokens = object
        .get("max_tokens")
        .and_then(|v| {
            v.as_u64()
                .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
                .or_else(|| {
                    v.as_f64()
                        .filter(|n| n.is_finite() && *n >= 0.0)
                        .map(|n| n.min(u32::MAX as f64) as u32)
                })
        })
        .unwrap_or(defaults.max_tokens);

    Parameters {
        temperature: float("temperature", defaults.temperature),
        top_p: float("top_p", defaults.top_p),
        max_tokens,
        presence_penalty: float("presence_penalty", defaults.presence_penalty),
        frequency_penalty: float("frequency_penalty", defaults.frequency_penalty),
    }
}
