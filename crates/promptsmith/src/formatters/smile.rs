//! SMILE rendering
//!
//! Compact line-oriented notation: fixed header lines, four list sections,
//! and a trailing `PARAMS:` line.

use super::format_number;
use crate::domain::ExportShape;

pub fn to_smile(shape: &ExportShape) -> String {
    let mut lines: Vec<String> = Vec::new();

    let headers = [
        ("TITLE", &shape.title),
        ("ROLE", &shape.role),
        ("TASK", &shape.task),
        ("AUDIENCE", &shape.audience),
        ("STYLE", &shape.style),
        ("TONE", &shape.tone),
    ];
    for (key, value) in headers {
        lines.push(format!("{}: {}", key, value.as_deref().unwrap_or_default()));
    }

    lines.push("CONSTRAINTS:".to_string());
    lines.extend(shape.constraints.iter().map(|c| format!(" - {}", c)));

    lines.push("STEPS:".to_string());
    lines.extend(
        shape
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| format!(" {}. {}", i + 1, step)),
    );

    lines.push("INPUTS:".to_string());
    lines.extend(
        shape
            .inputs
            .iter()
            .map(|input| format!(" - {} = {}", input.name, input.value)),
    );

    lines.push("EXAMPLES:".to_string());
    lines.extend(shape.examples.iter().map(|e| format!(" - {}", e)));

    let params = &shape.parameters;
    let mut pairs = vec![
        format!("temperature={}", format_number(params.temperature)),
        format!("top_p={}", format_number(params.top_p)),
        format!("max_tokens={}", params.max_tokens),
    ];
    if let Some(presence) = params.presence_penalty {
        pairs.push(format!("presence_penalty={}", format_number(presence)));
    }
    if let Some(frequency) = params.frequency_penalty {
        pairs.push(format!("frequency_penalty={}", format_number(frequency)));
    }
    lines.push(format!("PARAMS: {}", pairs.join("; ")));

    lines
        .iter()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ParameterSchema, PromptDocument};

    #[test]
    fn test_empty_document() {
        let smile = to_smile(&PromptDocument::new().to_export_shape(ParameterSchema::Basic));
        assert_eq!(
            smile,
            "TITLE:\nROLE:\nTASK:\nAUDIENCE:\nSTYLE:\nTONE:\n\
             CONSTRAINTS:\nSTEPS:\nINPUTS:\nEXAMPLES:\n\
             PARAMS: temperature=0.7; top_p=1; max_tokens=1024"
        );
    }

    #[test]
    fn test_sections() {
        let doc = PromptDocument {
            role: "Reviewer".to_string(),
            constraints: vec!["Be kind".to_string()],
            steps: vec!["Read".to_string(), "Comment".to_string()],
            inputs: vec!["repo: api:v2".to_string()],
            examples: vec!["LGTM".to_string()],
            ..Default::default()
        };
        let smile = to_smile(&doc.to_export_shape(ParameterSchema::Extended));

        assert!(smile.contains("ROLE: Reviewer\n"));
        assert!(smile.contains("CONSTRAINTS:\n - Be kind\nSTEPS:\n 1. Read\n 2. Comment\n"));
        assert!(smile.contains("INPUTS:\n - repo = api:v2\nEXAMPLES:\n - LGTM\n"));
        assert!(smile.ends_with(
            "PARAMS: temperature=0.7; top_p=1; max_tokens=1024; presence_penalty=0; frequency_penalty=0"
        ));
    }
}
