use crate::constants::limits::SUGGESTION_LIMIT;
use crate::errors::ToolError;
use crate::utils::suggest::suggest;

pub fn unknown_tool_error(tool: &str, known_tools: &[&str]) -> ToolError {
    let suggestions = if tool.trim().is_empty() {
        Vec::new()
    } else {
        suggest(tool, known_tools, SUGGESTION_LIMIT)
    };
    let did_you_mean = if suggestions.is_empty() {
        String::new()
    } else {
        format!("Did you mean: {}?", suggestions.join(", "))
    };
    let list_hint = format!("Use one of: {}.", known_tools.join(", "));
    let hint = [did_you_mean, list_hint]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    ToolError::not_found(format!("Unknown tool: {}", tool))
        .with_hint(hint)
        .with_details(serde_json::json!({
            "known_tools": known_tools,
            "did_you_mean": suggestions,
        }))
}
