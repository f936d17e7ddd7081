//! Error taxonomy for a report pipeline run.

use thiserror::Error;

/// Errors that can end a pipeline run.
///
/// `Configuration` and `BackendUnavailable` carry messages that are already
/// actionable; the pipeline never wraps them further.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Missing or malformed search credential
    #[error("[configuration] {0}")]
    Configuration(String),

    /// Transport or provider failure while searching
    #[error("[search failed] query: '{query}'\n{source_type}: {message}\nCheck that the API key is valid and the network is reachable.")]
    SearchBackend {
        query: String,
        source_type: String,
        message: String,
    },

    /// The search call succeeded but produced nothing
    #[error("[no results] no search results for '{0}'.\nTry other keywords or a more specific topic.")]
    EmptyResult(String),

    /// The search response had an unexpected shape
    #[error("[unexpected response shape] {0}")]
    Schema(String),

    /// A result entry could not be rendered
    #[error("[formatting failed] result #{index}: {message}\nentry: {excerpt}")]
    Formatting {
        index: usize,
        message: String,
        excerpt: String,
    },

    /// The local generation service could not be reached
    #[error("[LLM connection failed] cannot reach the generation service at {endpoint}: {message}")]
    BackendUnavailable { endpoint: String, message: String },

    /// The generation service was reached but the call failed
    #[error("[report generation failed] topic: '{topic}'\n{message}\nprompt context length: {context_len} chars")]
    Generation {
        topic: String,
        message: String,
        context_len: usize,
    },

    /// Anything outside the taxonomy above
    #[error("[unexpected error] while generating a report for '{topic}': {message}")]
    UnknownPipeline { topic: String, message: String },
}

impl ReportError {
    /// Stable identifier used by the HTTP API and the UI.
    pub fn kind(&self) -> &'static str {
        match self {
            ReportError::Configuration(_) => "configuration",
            ReportError::SearchBackend { .. } => "search_backend",
            ReportError::EmptyResult(_) => "empty_result",
            ReportError::Schema(_) => "schema",
            ReportError::Formatting { .. } => "formatting",
            ReportError::BackendUnavailable { .. } => "backend_unavailable",
            ReportError::Generation { .. } => "generation",
            ReportError::UnknownPipeline { .. } => "unknown_pipeline",
        }
    }

    /// Step-by-step guide shown next to the error message.
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            ReportError::Configuration(_) => Some(CREDENTIAL_GUIDE),
            ReportError::BackendUnavailable { .. } => Some(OLLAMA_GUIDE),
            ReportError::EmptyResult(_) => None,
            _ => Some(TROUBLESHOOTING_GUIDE),
        }
    }

    /// Wraps a failure that has no better home in the taxonomy.
    pub fn unknown(topic: &str, err: impl std::fmt::Display) -> Self {
        ReportError::UnknownPipeline {
            topic: topic.to_string(),
            message: err.to_string(),
        }
    }
}

const CREDENTIAL_GUIDE: &str = "\
1. Get an API key at https://tavily.com
2. Put TAVILY_API_KEY=<key> in .env, or enter it in the settings panel
3. Keys are at least 10 characters long";

const OLLAMA_GUIDE: &str = "\
1. Start the server in a terminal: `ollama serve`
2. Download the model: `ollama pull llama3.1`
3. Check that it is running: `ollama list`
4. The server listens on port 11434 by default; check firewall settings";

const TROUBLESHOOTING_GUIDE: &str = "\
Ollama server: make sure `ollama serve` is running and `ollama pull llama3.1` completed.
API key: check that the Tavily key is valid, or issue a new one at https://tavily.com
No results: try other keywords and check the network connection.";

pub type Result<T> = std::result::Result<T, ReportError>;
