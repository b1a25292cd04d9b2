//! PromptDocument - The editable structured prompt specification
//!
//! Pure domain entity. Edits are synchronous and total: out-of-range list
//! operations are no-ops rather than errors.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{Direction, DocumentField, ListField};

pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_TOP_P: f64 = 1.0;
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_PRESENCE_PENALTY: f64 = 0.0;
pub const DEFAULT_FREQUENCY_PENALTY: f64 = 0.0;

/// Sampling parameters attached to a prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
    pub presence_penalty: f64,
    pub frequency_penalty: f64,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            max_tokens: DEFAULT_MAX_TOKENS,
            presence_penalty: DEFAULT_PRESENCE_PENALTY,
            frequency_penalty: DEFAULT_FREQUENCY_PENALTY,
        }
    }
}

/// A named input, parsed from a raw `name: value` line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputPair {
    pub name: String,
    pub value: String,
}

impl InputPair {
    /// Flatten back into the single editable line
    pub fn to_line(&self) -> String {
        if self.value.is_empty() {
            self.name.clone()
        } else {
            format!("{}: {}", self.name, self.value)
        }
    }
}

/// Split an input line on its first colon.
///
/// Everything after the first colon, further colons included, is the value.
pub fn parse_input_line(line: &str) -> InputPair {
    match line.split_once(':') {
        Some((name, value)) => InputPair {
            name: name.trim().to_string(),
            value: value.trim().to_string(),
        },
        None => InputPair {
            name: line.trim().to_string(),
            value: String::new(),
        },
    }
}

/// Edit applied to one of the document's ordered lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListOp {
    Add(String),
    RemoveAt(usize),
    MoveAt(usize, Direction),
    SetAt(usize, String),
}

/// PromptDocument - canonical editable prompt specification
///
/// List entries may be blank while editing; exported views drop them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptDocument {
    pub title: String,
    pub role: String,
    pub task: String,
    pub audience: String,
    pub style: String,
    pub tone: String,
    pub constraints: Vec<String>,
    pub steps: Vec<String>,
    /// Raw `name: value` lines
    pub inputs: Vec<String>,
    pub examples: Vec<String>,
    pub parameters: Parameters,
}

impl PromptDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&self, field: DocumentField) -> &str {
        match field {
            DocumentField::Title => &self.title,
            DocumentField::Role => &self.role,
            DocumentField::Task => &self.task,
            DocumentField::Audience => &self.audience,
            DocumentField::Style => &self.style,
            DocumentField::Tone => &self.tone,
        }
    }

    pub fn set_field(&mut self, field: DocumentField, value: impl Into<String>) {
        let slot = match field {
            DocumentField::Title => &mut self.title,
            DocumentField::Role => &mut self.role,
            DocumentField::Task => &mut self.task,
            DocumentField::Audience => &mut self.audience,
            DocumentField::Style => &mut self.style,
            DocumentField::Tone => &mut self.tone,
        };
        *slot = value.into();
    }

    pub fn list(&self, field: ListField) -> &[String] {
        match field {
            ListField::Constraints => &self.constraints,
            ListField::Steps => &self.steps,
            ListField::Inputs => &self.inputs,
            ListField::Examples => &self.examples,
        }
    }

    pub fn list_mut(&mut self, field: ListField) -> &mut Vec<String> {
        match field {
            ListField::Constraints => &mut self.constraints,
            ListField::Steps => &mut self.steps,
            ListField::Inputs => &mut self.inputs,
            ListField::Examples => &mut self.examples,
        }
    }

    /// Apply a list edit. Returns whether the list changed.
    pub fn apply_list_op(&mut self, field: ListField, op: ListOp) -> bool {
        apply_list_op(self.list_mut(field), op)
    }
}

/// Apply a list edit to a raw list. Returns whether the list changed.
pub fn apply_list_op(list: &mut Vec<String>, op: ListOp) -> bool {
    match op {
        ListOp::Add(value) => {
            list.push(value);
            true
        }
        ListOp::RemoveAt(index) => {
            if index < list.len() {
                list.remove(index);
                true
            } else {
                false
            }
        }
        ListOp::MoveAt(index, direction) => {
            if index >= list.len() {
                return false;
            }
            match direction.neighbor(index, list.len()) {
                Some(target) => {
                    list.swap(index, target);
                    true
                }
                None => false,
            }
        }
        ListOp::SetAt(index, value) => match list.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        },
    }
}
