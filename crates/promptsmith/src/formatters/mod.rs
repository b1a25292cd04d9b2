//! Document Formatters
//!
//! Render an [`ExportShape`] into each supported notation, and import a
//! document back from JSON. Rendering never fails: blank or missing data is
//! omitted rather than reported.

mod import;
mod json;
mod markdown;
mod smile;
mod yaml;

pub use import::import_json;
pub use json::to_json;
pub use markdown::to_markdown;
pub use smile::to_smile;
pub use yaml::to_yaml;

use crate::domain::{ExportShape, OutputFormat};

/// Render a document shape in the requested format
pub fn render(format: OutputFormat, shape: &ExportShape) -> String {
    match format {
        OutputFormat::Markdown => to_markdown(shape),
        OutputFormat::Json => to_json(shape),
        OutputFormat::Yaml => to_yaml(&shape.to_value()),
        OutputFormat::Smile => to_smile(shape),
    }
}

/// Shortest display form of a parameter value (`1`, `0.7`)
pub(crate) fn format_number(value: f64) -> String {
    format!("{}", value)
}
