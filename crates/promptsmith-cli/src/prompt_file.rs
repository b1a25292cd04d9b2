//! Prompt files on disk
//!
//! A prompt file holds the editable document snapshot, the same JSON the
//! library stores. Blank list entries survive so positions stay stable
//! between edits. Reading goes through the lenient importer, so an exported
//! `.json` artifact can be edited again too.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use promptsmith::formatters::import_json;
use promptsmith::PromptDocument;

pub fn read(path: &Path) -> Result<PromptDocument> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read prompt file {:?}", path))?;
    import_json(&content).with_context(|| format!("Invalid prompt file {:?}", path))
}

pub fn write(path: &Path, doc: &PromptDocument) -> Result<()> {
    let json = serde_json::to_string_pretty(doc).context("Failed to serialize prompt")?;
    fs::write(path, format!("{}\n", json))
        .with_context(|| format!("Failed to write prompt file {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptsmith::{ListField, ListOp};

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.json");

        let mut doc = PromptDocument::new();
        doc.role = "Tutor".to_string();
        doc.inputs = vec!["level: beginner".to_string()];
        doc.parameters.frequency_penalty = 0.4;
        write(&path, &doc).unwrap();

        assert_eq!(read(&path).unwrap(), doc);
    }

    #[test]
    fn test_blank_items_keep_their_positions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.json");

        let mut doc = PromptDocument::new();
        doc.apply_list_op(ListField::Steps, ListOp::Add(String::new()));
        write(&path, &doc).unwrap();

        let mut reread = read(&path).unwrap();
        assert_eq!(reread.steps, vec![String::new()]);
        assert!(reread.apply_list_op(ListField::Steps, ListOp::SetAt(0, "Plan".to_string())));
        assert_eq!(reread.steps, vec!["Plan".to_string()]);
    }

    #[test]
    fn test_reads_exported_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.json");
        fs::write(
            &path,
            r#"{"role": "Tutor", "inputs": [{"name": "level", "value": "beginner"}]}"#,
        )
        .unwrap();

        let doc = read(&path).unwrap();
        assert_eq!(doc.role, "Tutor");
        assert_eq!(doc.inputs, vec!["level: beginner".to_string()]);
    }

    #[test]
    fn test_read_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ nope").unwrap();

        let err = read(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid prompt file"));
    }
}
