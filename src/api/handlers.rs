use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::time::Instant;

use crate::data_models::SessionReport;
use crate::error::ReportError;
use crate::export::{render_markdown, sanitize_topic};
use crate::search::MAX_RESULTS;

use super::AppState;
use super::models::{
    CredentialsRequest, DownloadQuery, ErrorBody, ErrorResponse, ReportRequest, StatusResponse,
};

/// Error half of every handler: a status code plus a JSON body the UI can
/// render with its remediation guide.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn bad_request(message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                kind: "bad_request".to_string(),
                message: message.to_string(),
                remediation: None,
            },
        }
    }

    fn not_found(message: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: ErrorBody {
                kind: "not_found".to_string(),
                message: message.to_string(),
                remediation: None,
            },
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        let status = match &err {
            ReportError::Configuration(_) => StatusCode::BAD_REQUEST,
            ReportError::EmptyResult(_) => StatusCode::NOT_FOUND,
            ReportError::BackendUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ReportError::SearchBackend { .. } | ReportError::Schema(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            body: ErrorBody {
                kind: err.kind().to_string(),
                message: err.to_string(),
                remediation: err.remediation().map(ToString::to_string),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { error: self.body })).into_response()
    }
}

pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        api_key_configured: state.credentials.is_configured(),
        search_provider: state.pipeline.search_backend().provider().to_string(),
        model: state.pipeline.generator().model().to_string(),
        max_results: MAX_RESULTS,
    })
}

pub async fn credentials_handler(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    state.credentials.set(&request.api_key)?;
    log::info!("search API key updated from the UI");
    Ok(status_handler(State(state)).await)
}

pub async fn report_handler(
    State(state): State<AppState>,
    Json(request): Json<ReportRequest>,
) -> Result<Json<SessionReport>, ApiError> {
    let start = Instant::now();
    let topic = request.topic.trim();

    if topic.is_empty() {
        return Err(ApiError::bad_request("Topic cannot be empty"));
    }

    let result = state.pipeline.run(topic).await?;
    let report = SessionReport::new(topic, result);
    state.session.lock().await.last_report = Some(report.clone());

    log::info!(
        "report request served in {}ms",
        start.elapsed().as_millis()
    );
    Ok(Json(report))
}

pub async fn last_report_handler(
    State(state): State<AppState>,
) -> Result<Json<SessionReport>, ApiError> {
    state
        .session
        .lock()
        .await
        .last_report
        .clone()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("No report has been generated yet"))
}

pub async fn download_handler(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    let session = state.session.lock().await;
    let report = session
        .last_report
        .as_ref()
        .ok_or_else(|| ApiError::not_found("No report has been generated yet"))?;

    let stem = match query.filename.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => sanitize_topic(name),
        _ => sanitize_topic(&report.topic),
    };
    let content = render_markdown(
        &report.report,
        &report.sources,
        state.pipeline.language(),
    );

    Ok((
        [
            (
                header::CONTENT_TYPE,
                "text/markdown; charset=utf-8".to_string(),
            ),
            (header::CONTENT_DISPOSITION, content_disposition(&stem)),
        ],
        content,
    )
        .into_response())
}

/// `attachment` header with an ASCII fallback name and the UTF-8 name per RFC 5987.
fn content_disposition(stem: &str) -> String {
    let ascii: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    let encoded: String = format!("{stem}.md")
        .bytes()
        .map(|b| {
            if b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-') {
                (b as char).to_string()
            } else {
                format!("%{b:02X}")
            }
        })
        .collect();
    format!("attachment; filename=\"{ascii}.md\"; filename*=UTF-8''{encoded}")
}
