//! ExportShape - Normalized, blank-filtered projection of a document
//!
//! Every renderer consumes this shape. Field order here is the canonical
//! key order of the JSON and YAML renderings.

use serde::{Deserialize, Serialize};

use super::document::{parse_input_line, InputPair, Parameters, PromptDocument};
use crate::domain::value_objects::ParameterSchema;

/// Parameters as exported under a given schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportParameters {
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
}

impl ExportParameters {
    pub fn from_parameters(parameters: &Parameters, schema: ParameterSchema) -> Self {
        let penalties = schema.includes_penalties();
        Self {
            temperature: parameters.temperature,
            top_p: parameters.top_p,
            max_tokens: parameters.max_tokens,
            presence_penalty: penalties.then_some(parameters.presence_penalty),
            frequency_penalty: penalties.then_some(parameters.frequency_penalty),
        }
    }
}

/// Canonical exported object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportShape {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    pub constraints: Vec<String>,
    pub steps: Vec<String>,
    pub inputs: Vec<InputPair>,
    pub examples: Vec<String>,
    pub parameters: ExportParameters,
}

impl ExportShape {
    /// Project a document, trimming scalars and dropping blank list entries
    pub fn from_document(doc: &PromptDocument, schema: ParameterSchema) -> Self {
        Self {
            title: non_blank(&doc.title),
            role: non_blank(&doc.role),
            task: non_blank(&doc.task),
            audience: non_blank(&doc.audience),
            style: non_blank(&doc.style),
            tone: non_blank(&doc.tone),
            constraints: non_blank_items(&doc.constraints),
            steps: non_blank_items(&doc.steps),
            inputs: doc
                .inputs
                .iter()
                .filter(|line| !line.trim().is_empty())
                .map(|line| parse_input_line(line))
                .filter(|pair| !(pair.name.is_empty() && pair.value.is_empty()))
                .collect(),
            examples: non_blank_items(&doc.examples),
            parameters: ExportParameters::from_parameters(&doc.parameters, schema),
        }
    }

    pub fn to_value(&self) -> serde_json::Value {
        // Only strings, numbers and nested containers: serialization cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl PromptDocument {
    pub fn to_export_shape(&self, schema: ParameterSchema) -> ExportShape {
        ExportShape::from_document(self, schema)
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn non_blank_items(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_scalars_are_omitted() {
        let doc = PromptDocument {
            role: "  Analyst  ".to_string(),
            task: "   ".to_string(),
            ..Default::default()
        };
        let shape = doc.to_export_shape(ParameterSchema::Extended);
        assert_eq!(shape.role.as_deref(), Some("Analyst"));
        assert_eq!(shape.task, None);

        let value = shape.to_value();
        assert!(value.get("task").is_none());
        assert_eq!(value["role"], "Analyst");
    }

    #[test]
    fn test_blank_list_entries_are_dropped() {
        let doc = PromptDocument {
            constraints: vec!["Be brief".to_string(), "".to_string(), "  ".to_string()],
            inputs: vec![
                "topic: AI".to_string(),
                " ".to_string(),
                "audience".to_string(),
            ],
            ..Default::default()
        };
        let shape = doc.to_export_shape(ParameterSchema::Extended);
        assert_eq!(shape.constraints, vec!["Be brief".to_string()]);
        assert_eq!(shape.inputs.len(), 2);
        assert_eq!(shape.inputs[0].name, "topic");
        assert_eq!(shape.inputs[0].value, "AI");
        assert_eq!(shape.inputs[1].name, "audience");
        assert_eq!(shape.inputs[1].value, "");
    }

    #[test]
    fn test_basic_schema_omits_penalties() {
        let doc = PromptDocument::new();
        let value = doc.to_export_shape(ParameterSchema::Basic).to_value();
        let params = value["parameters"].as_object().unwrap();
        assert!(!params.contains_key("presence_penalty"));
        assert!(!params.contains_key("frequency_penalty"));
        assert_eq!(params["max_tokens"], 1024);

        let extended = doc.to_export_shape(ParameterSchema::Extended).to_value();
        assert_eq!(extended["parameters"]["presence_penalty"], 0.0);
    }
}
