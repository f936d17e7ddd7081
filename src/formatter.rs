//! Turns a search result set into prompt context and a source list.

use serde_json::Value;

use crate::data_models::SearchResult;
use crate::error::{ReportError, Result};

const EXCERPT_CHARS: usize = 200;

/// Renders every result as a numbered section.
///
/// Entries that are not JSON objects abort formatting; missing fields do not.
pub fn format_results(results: &[Value]) -> Result<String> {
    log::info!("formatting search results count={}", results.len());
    let mut formatted = String::new();

    for (idx, value) in results.iter().enumerate() {
        let result = SearchResult::from_value(value).ok_or_else(|| ReportError::Formatting {
            index: idx + 1,
            message: format!("expected a JSON object, got {}", json_type_name(value)),
            excerpt: json_excerpt(value, EXCERPT_CHARS),
        })?;
        formatted.push_str(&format_section(idx + 1, &result));
    }

    log::info!("formatting done sections={}", results.len());
    Ok(formatted)
}

fn format_section(number: usize, result: &SearchResult) -> String {
    format!(
        "\n## Search Result {number}\n**Source:** {}\n**Title:** {}\n**Content:**\n{}\n\n---\n",
        result.url_or_placeholder(),
        result.title_or_placeholder(),
        result.content_or_placeholder(),
    )
}

/// URLs of every entry that has one, in original order.
pub fn extract_sources(results: &[Value]) -> Vec<String> {
    let urls: Vec<String> = results
        .iter()
        .filter_map(|value| value.get("url"))
        .filter_map(|url| url.as_str())
        .map(ToString::to_string)
        .collect();
    log::info!("extracted sources count={}", urls.len());
    urls
}

pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub fn json_excerpt(value: &Value, max_chars: usize) -> String {
    value.to_string().chars().take(max_chars).collect()
}
