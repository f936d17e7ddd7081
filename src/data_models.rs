use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder rendered for fields a search record does not carry.
pub const MISSING_FIELD: &str = "N/A";

/// One search record, decoded leniently from the provider's JSON.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SearchResult {
    pub url: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
}

impl SearchResult {
    pub fn new(url: &str, title: &str, content: &str) -> SearchResult {
        SearchResult {
            url: Some(url.to_string()),
            title: Some(title.to_string()),
            content: Some(content.to_string()),
        }
    }

    /// Reads the known fields out of a JSON object. Non-string fields count
    /// as missing. Returns `None` when `value` is not an object at all.
    pub fn from_value(value: &Value) -> Option<SearchResult> {
        let record = value.as_object()?;
        let field = |name: &str| {
            record
                .get(name)
                .and_then(|v| v.as_str())
                .map(ToString::to_string)
        };
        Some(SearchResult {
            url: field("url"),
            title: field("title"),
            content: field("content"),
        })
    }

    pub fn url_or_placeholder(&self) -> &str {
        self.url.as_deref().unwrap_or(MISSING_FIELD)
    }

    pub fn title_or_placeholder(&self) -> &str {
        self.title.as_deref().unwrap_or(MISSING_FIELD)
    }

    pub fn content_or_placeholder(&self) -> &str {
        self.content.as_deref().unwrap_or(MISSING_FIELD)
    }
}

/// Terminal artifact of one pipeline run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReportResult {
    pub report: String,
    pub sources: Vec<String>,
}

/// What the UI keeps around to re-display and download the last report.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub topic: String,
    pub report: String,
    pub sources: Vec<String>,
}

impl SessionReport {
    pub fn new(topic: &str, result: ReportResult) -> SessionReport {
        SessionReport {
            topic: topic.to_string(),
            report: result.report,
            sources: result.sources,
        }
    }
}
