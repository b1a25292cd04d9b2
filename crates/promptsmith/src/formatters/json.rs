//! JSON rendering

use crate::domain::ExportShape;

/// Pretty-printed JSON with two-space indentation and canonical key order
pub fn to_json(shape: &ExportShape) -> String {
    serde_json::to_string_pretty(shape).unwrap_or_default()
}
