//! Markdown rendering

use super::format_number;
use crate::domain::ExportShape;

/// Render the document as Markdown.
///
/// Sections whose backing field or list is empty are left out entirely.
pub fn to_markdown(shape: &ExportShape) -> String {
    let mut sections: Vec<String> = Vec::new();

    if let Some(title) = &shape.title {
        sections.push(format!("# {}", title));
    }

    let labelled = [
        ("Role", &shape.role),
        ("Task", &shape.task),
        ("Audience", &shape.audience),
        ("Style", &shape.style),
        ("Tone", &shape.tone),
    ];
    for (label, value) in labelled {
        if let Some(value) = value {
            sections.push(format!("**{}:** {}", label, value));
        }
    }

    if !shape.constraints.is_empty() {
        sections.push(list_section("Constraints", bullets(&shape.constraints)));
    }

    if !shape.steps.is_empty() {
        let numbered = shape
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| format!("{}. {}", i + 1, step))
            .collect();
        sections.push(list_section("Steps", numbered));
    }

    if !shape.inputs.is_empty() {
        let inputs = shape
            .inputs
            .iter()
            .map(|input| {
                if input.value.is_empty() {
                    format!("- {}", input.name)
                } else {
                    format!("- {}: {}", input.name, input.value)
                }
            })
            .collect();
        sections.push(list_section("Inputs", inputs));
    }

    if !shape.examples.is_empty() {
        sections.push(list_section("Examples", bullets(&shape.examples)));
    }

    let params = &shape.parameters;
    let mut parameters = vec![
        format!("- Temperature: {}", format_number(params.temperature)),
        format!("- Top-p: {}", format_number(params.top_p)),
        format!("- Max tokens: {}", params.max_tokens),
    ];
    if let Some(presence) = params.presence_penalty {
        parameters.push(format!("- Presence penalty: {}", format_number(presence)));
    }
    if let Some(frequency) = params.frequency_penalty {
        parameters.push(format!("- Frequency penalty: {}", format_number(frequency)));
    }
    sections.push(list_section("Parameters", parameters));

    sections.join("\n\n").trim().to_string()
}

fn bullets(items: &[String]) -> Vec<String> {
    items.iter().map(|item| format!("- {}", item)).collect()
}

fn list_section(label: &str, lines: Vec<String>) -> String {
    format!("**{}:**\n{}", label, lines.join("\n"))
}
