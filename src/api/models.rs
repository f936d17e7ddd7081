use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub topic: String,
}

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub api_key: String,
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub filename: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub api_key_configured: bool,
    pub search_provider: String,
    pub model: String,
    pub max_results: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}
