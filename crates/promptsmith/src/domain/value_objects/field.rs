//! Field selectors for document edits

use serde::{Deserialize, Serialize};

/// Scalar text field of a prompt document
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DocumentField {
    Title,
    Role,
    Task,
    Audience,
    Style,
    Tone,
}

/// Ordered list field of a prompt document
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ListField {
    Constraints,
    Steps,
    Inputs,
    Examples,
}

/// Neighbor to swap with when moving a list item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Neighbor index, or `None` when it would fall outside `0..len`
    pub fn neighbor(&self, index: usize, len: usize) -> Option<usize> {
        let target = match self {
            Direction::Up => index.checked_sub(1)?,
            Direction::Down => index.checked_add(1)?,
        };
        (target < len).then_some(target)
    }
}

impl std::str::FromStr for DocumentField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "title" => Ok(DocumentField::Title),
            "role" => Ok(DocumentField::Role),
            "task" => Ok(DocumentField::Task),
            "audience" => Ok(DocumentField::Audience),
            "style" => Ok(DocumentField::Style),
            "tone" => Ok(DocumentField::Tone),
            _ => Err(format!("Unknown field: {}", s)),
        }
    }
}

impl std::str::FromStr for ListField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "constraints" | "constraint" => Ok(ListField::Constraints),
            "steps" | "step" => Ok(ListField::Steps),
            "inputs" | "input" => Ok(ListField::Inputs),
            "examples" | "example" => Ok(ListField::Examples),
            _ => Err(format!("Unknown list: {}", s)),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" | "-1" => Ok(Direction::Up),
            "down" | "+1" | "1" => Ok(Direction::Down),
            _ => Err(format!("Unknown direction: {}", s)),
        }
    }
}

impl std::fmt::Display for ListField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListField::Constraints => write!(f, "constraints"),
            ListField::Steps => write!(f, "steps"),
            ListField::Inputs => write!(f, "inputs"),
            ListField::Examples => write!(f, "examples"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbor_bounds() {
        assert_eq!(Direction::Up.neighbor(0, 3), None);
        assert_eq!(Direction::Down.neighbor(2, 3), None);
        assert_eq!(Direction::Up.neighbor(2, 3), Some(1));
        assert_eq!(Direction::Down.neighbor(0, 3), Some(1));
    }
}
