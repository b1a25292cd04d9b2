//! ParameterSchema - Which sampling parameters an export carries

use serde::{Deserialize, Serialize};

/// Parameter schema used when exporting a document.
///
/// `Extended` carries presence/frequency penalties; `Basic` omits them.
/// Documents always hold every parameter, so switching is lossless.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParameterSchema {
    Basic,
    #[default]
    Extended,
}

impl ParameterSchema {
    pub fn includes_penalties(&self) -> bool {
        matches!(self, ParameterSchema::Extended)
    }
}

impl std::str::FromStr for ParameterSchema {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(ParameterSchema::Basic),
            "extended" => Ok(ParameterSchema::Extended),
            _ => Err(format!("Unknown parameter schema: {}", s)),
        }
    }
}
