//! HTTP surface: router, shared state, and the mapping from pipeline
//! failure classes to JSON error responses.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::error;

use crate::config::AppConfig;
use crate::extract::record::ExtractOutcome;
use crate::extract::{ExtractError, Extractor};
use crate::llm::gemini::GeminiClient;
use crate::llm::LlmError;
use crate::pdf;
use crate::sources::scrape::HttpScraper;
use crate::sources::serper::SerperClient;

/// Remediation text for the flagged-credential rejection. Kept verbatim so
/// operators get the rotation instructions, not a generic 403.
const LEAKED_KEY_REMEDIATION: &str = "API key error: Your Gemini API key has been reported as \
leaked. Please generate a new API key from Google AI Studio \
(https://aistudio.google.com/apikey) and update your .env file with GEMINI_API_KEY=<new_key>";

#[derive(Clone)]
pub struct AppState {
    extractor: Arc<Extractor>,
}

impl AppState {
    /// Wire the production collaborators from process configuration.
    pub fn from_config(cfg: &AppConfig) -> Self {
        let extractor = Extractor::new(
            Arc::new(SerperClient::new(cfg.serper_api_key.clone())),
            Arc::new(HttpScraper::new()),
            Arc::new(GeminiClient::new(cfg.gemini_api_key.clone())),
        );
        Self::new(Arc::new(extractor))
    }

    /// Wire an arbitrary extractor (tests inject stub collaborators here).
    pub fn new(extractor: Arc<Extractor>) -> Self {
        Self { extractor }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/school", get(api_school))
        .route("/api/pdf", get(api_pdf))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn index() -> Json<serde_json::Value> {
    Json(json!({
        "service": "school-agent-backend",
        "endpoints": ["/health", "/api/school?q=<name>", "/api/pdf?q=<name>"],
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "service": "school-agent-backend" }))
}

#[derive(serde::Deserialize)]
struct SchoolQuery {
    #[serde(default)]
    q: String,
}

async fn api_school(
    State(state): State<AppState>,
    Query(params): Query<SchoolQuery>,
) -> Result<Json<ExtractOutcome>, ApiError> {
    let outcome = state.extractor.extract(&params.q).await?;
    Ok(Json(outcome))
}

async fn api_pdf(State(state): State<AppState>, Query(params): Query<SchoolQuery>) -> Response {
    let q = params.q.trim().to_string();
    if q.is_empty() {
        return ApiError::from(ExtractError::EmptyQuery).into_response();
    }

    // Pipeline failures still produce a document: the error notice is
    // rendered into the PDF instead of a JSON body.
    let document = match state.extractor.extract(&q).await {
        Ok(outcome) => pdf::render_outcome(&outcome),
        Err(err) => pdf::render_error(&ApiError::from(err).message),
    };

    match document {
        Ok(bytes) => pdf_response(&q, bytes),
        Err(err) => ApiError::internal(err).into_response(),
    }
}

fn pdf_response(q: &str, bytes: Vec<u8>) -> Response {
    let filename = q.replace('"', "");
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}.pdf\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// JSON error response carrying the HTTP status for the failure class.
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    /// Outermost boundary for unexpected failures: full diagnostics go to
    /// the log, a generic human-readable message goes to the caller.
    fn internal(err: anyhow::Error) -> Self {
        error!(error = ?err, "unexpected internal failure");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("Server error: {err}"),
        }
    }
}

impl From<ExtractError> for ApiError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::EmptyQuery => Self {
                status: StatusCode::BAD_REQUEST,
                message: "missing query parameter 'q'".to_string(),
            },
            ExtractError::NoPagesFound => Self {
                status: StatusCode::NOT_FOUND,
                message: "no pages found".to_string(),
            },
            ExtractError::Search(inner) => Self::internal(inner),
            ExtractError::Llm(llm) => match llm {
                LlmError::MissingApiKey => Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "GEMINI_API_KEY is not set in environment variables".to_string(),
                },
                LlmError::PermissionDenied { leaked: true, .. } => Self {
                    status: StatusCode::FORBIDDEN,
                    message: LEAKED_KEY_REMEDIATION.to_string(),
                },
                LlmError::PermissionDenied {
                    leaked: false,
                    message,
                } => Self {
                    status: StatusCode::FORBIDDEN,
                    message: format!(
                        "API key permission denied: {message}. Please check your \
                         GEMINI_API_KEY in the .env file."
                    ),
                },
                LlmError::Invocation(message) => Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: format!(
                        "Error calling Gemini API: {message}. Please check your API key \
                         and try again."
                    ),
                },
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
