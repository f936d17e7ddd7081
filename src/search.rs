use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::config::Credentials;
use crate::error::{ReportError, Result};
use crate::formatter::{json_excerpt, json_type_name};

pub const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";
pub const MAX_RESULTS: u32 = 3;
pub const SEARCH_DEPTH: &str = "advanced";

/// A remote web search provider.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Human-readable provider name for logs and the status endpoint.
    fn provider(&self) -> &str;

    /// Fails with `Configuration` when the backend cannot be called at all.
    fn ensure_configured(&self) -> Result<()> {
        Ok(())
    }

    /// Issues one search and returns the provider's raw response.
    async fn search(&self, query: &str) -> Result<Value>;
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    max_results: u32,
    search_depth: &'a str,
    include_answer: bool,
    include_raw_content: bool,
}

pub struct TavilyClient {
    http: reqwest::Client,
    credentials: Credentials,
    endpoint: String,
}

impl TavilyClient {
    pub fn new(credentials: Credentials) -> Self {
        Self::with_endpoint(credentials, TAVILY_SEARCH_URL)
    }

    pub fn with_endpoint(credentials: Credentials, endpoint: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials,
            endpoint: endpoint.to_string(),
        }
    }

    fn backend_error(query: &str, source_type: &str, message: impl ToString) -> ReportError {
        ReportError::SearchBackend {
            query: query.to_string(),
            source_type: source_type.to_string(),
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl SearchBackend for TavilyClient {
    fn provider(&self) -> &str {
        "Tavily"
    }

    fn ensure_configured(&self) -> Result<()> {
        self.credentials.require().map(|_| ())
    }

    async fn search(&self, query: &str) -> Result<Value> {
        let api_key = self.credentials.require()?;
        let body = TavilyRequest {
            query,
            max_results: MAX_RESULTS,
            search_depth: SEARCH_DEPTH,
            include_answer: true,
            include_raw_content: true,
        };

        log::debug!("POST {} max_results={}", self.endpoint, MAX_RESULTS);
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::backend_error(query, "transport", e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Self::backend_error(
                query,
                "provider",
                format!("status {status}: {text}"),
            ));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| Self::backend_error(query, "decode", e))
    }
}

/// Pulls the ordered result list out of a raw search response.
///
/// Objects must carry a `results` array; a bare array is taken as is.
pub fn normalize_response(query: &str, response: Value) -> Result<Vec<Value>> {
    let results = match response {
        // a bare `{}` carries nothing to report, same as an empty result list
        Value::Object(map) if map.is_empty() => {
            return Err(ReportError::EmptyResult(query.to_string()));
        }
        Value::Object(mut map) => match map.remove("results") {
            Some(results) => results,
            None => {
                let keys: Vec<&String> = map.keys().collect();
                return Err(ReportError::Schema(format!(
                    "search response has no 'results' field; keys: {keys:?}; body: {}",
                    json_excerpt(&Value::Object(map.clone()), 300)
                )));
            }
        },
        Value::Array(items) => Value::Array(items),
        other => {
            return Err(ReportError::Schema(format!(
                "search response was a {}, expected an object or an array; body: {}",
                json_type_name(&other),
                json_excerpt(&other, 200)
            )));
        }
    };

    match results {
        Value::Array(items) if items.is_empty() => Err(ReportError::EmptyResult(query.to_string())),
        Value::Array(items) => Ok(items),
        other => Err(ReportError::Schema(format!(
            "search results were a {}, expected an array; body: {}",
            json_type_name(&other),
            json_excerpt(&other, 200)
        ))),
    }
}
