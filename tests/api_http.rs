// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health and GET /
// - GET /api/school (missing/blank q, happy path, error mapping)
// - GET /api/pdf (missing q, attachment headers)

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use school_agent::api::{self, AppState};
use school_agent::config::AppConfig;
use school_agent::llm::{LlmClient, LlmError};
use school_agent::sources::{PageScraper, SearchBackend, SearchHit};
use school_agent::Extractor;

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

/// Router wired like the binary, but with no credentials configured. Only
/// routes that never reach the network are exercised with it.
fn offline_router() -> Router {
    let state = AppState::from_config(&AppConfig::default());
    api::router(state)
}

// ---- stub collaborators for end-to-end routing tests ----

struct StubSearch {
    yellowslate: Vec<SearchHit>,
    edustoke: Vec<SearchHit>,
}

impl StubSearch {
    fn resolving_both() -> Self {
        let hit = |link: &str| SearchHit {
            link: link.to_string(),
            title: String::new(),
            snippet: String::new(),
        };
        Self {
            yellowslate: vec![hit("https://yellowslate.com/school/bangalore/green-valley")],
            edustoke: vec![hit("https://www.edustoke.com/bangalore/green-valley")],
        }
    }

    fn resolving_none() -> Self {
        Self {
            yellowslate: Vec::new(),
            edustoke: Vec::new(),
        }
    }
}

#[async_trait]
impl SearchBackend for StubSearch {
    async fn search(&self, query: &str, _num: usize) -> anyhow::Result<Vec<SearchHit>> {
        if query.ends_with("yellowslate") {
            Ok(self.yellowslate.clone())
        } else {
            Ok(self.edustoke.clone())
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

struct StubScraper;

#[async_trait]
impl PageScraper for StubScraper {
    async fn scrape(&self, url: &str) -> anyhow::Result<String> {
        Ok(format!("Title: Green Valley School\n\nprofile text from {url}"))
    }
}

enum LlmScript {
    Reply(&'static str),
    DenyLeaked,
}

struct ScriptedLlm {
    script: LlmScript,
    calls: AtomicUsize,
}

impl ScriptedLlm {
    fn new(script: LlmScript) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            LlmScript::Reply(text) => Ok(text.to_string()),
            LlmScript::DenyLeaked => Err(LlmError::PermissionDenied {
                message: "API key was reported as leaked".to_string(),
                leaked: true,
            }),
        }
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

fn stubbed_router(search: StubSearch, llm: ScriptedLlm) -> Router {
    let extractor = Extractor::new(Arc::new(search), Arc::new(StubScraper), Arc::new(llm));
    api::router(AppState::new(Arc::new(extractor)))
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Json) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let json = serde_json::from_slice(&bytes).expect("parse json body");
    (status, json)
}

#[tokio::test]
async fn health_returns_service_descriptor() {
    let (status, v) = get_json(offline_router(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["status"], "ok");
    assert_eq!(v["service"], "school-agent-backend");
}

#[tokio::test]
async fn index_lists_endpoints() {
    let (status, v) = get_json(offline_router(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(v["endpoints"].is_array());
}

#[tokio::test]
async fn school_without_query_is_a_client_error() {
    let (status, v) = get_json(offline_router(), "/api/school").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["error"], "missing query parameter 'q'");
}

#[tokio::test]
async fn school_with_blank_query_is_a_client_error() {
    let (status, v) = get_json(offline_router(), "/api/school?q=%20%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["error"], "missing query parameter 'q'");
}

#[tokio::test]
async fn pdf_without_query_is_a_client_error() {
    let (status, v) = get_json(offline_router(), "/api/pdf").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["error"], "missing query parameter 'q'");
}

#[tokio::test]
async fn school_happy_path_returns_record_with_sources() {
    let app = stubbed_router(
        StubSearch::resolving_both(),
        ScriptedLlm::new(LlmScript::Reply(
            r#"{"school_name": "Green Valley School", "facilities": ["Library"]}"#,
        )),
    );

    let (status, v) = get_json(app, "/api/school?q=Green%20Valley").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["school_name"], "Green Valley School");
    assert_eq!(v["facilities"][0], "Library");
    assert_eq!(
        v["_sources"]["yellowslate"],
        "https://yellowslate.com/school/bangalore/green-valley"
    );
    assert_eq!(
        v["_sources"]["edustoke"],
        "https://www.edustoke.com/bangalore/green-valley"
    );
}

#[tokio::test]
async fn school_with_no_matching_pages_is_not_found() {
    let app = stubbed_router(
        StubSearch::resolving_none(),
        ScriptedLlm::new(LlmScript::Reply("{}")),
    );

    let (status, v) = get_json(app, "/api/school?q=Green%20Valley").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["error"], "no pages found");
}

#[tokio::test]
async fn leaked_credential_maps_to_forbidden_with_rotation_advice() {
    let app = stubbed_router(
        StubSearch::resolving_both(),
        ScriptedLlm::new(LlmScript::DenyLeaked),
    );

    let (status, v) = get_json(app, "/api/school?q=Green%20Valley").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let message = v["error"].as_str().expect("error message");
    assert!(message.contains("reported as leaked"), "got: {message}");
    assert!(message.contains("generate a new API key"), "got: {message}");
}

#[tokio::test]
async fn pdf_happy_path_returns_attachment() {
    let app = stubbed_router(
        StubSearch::resolving_both(),
        ScriptedLlm::new(LlmScript::Reply(r#"{"school_name": "Green Valley School"}"#)),
    );

    let req = Request::builder()
        .method("GET")
        .uri("/api/pdf?q=Green%20Valley")
        .body(Body::empty())
        .expect("build request");
    let resp = app.oneshot(req).await.expect("oneshot /api/pdf");

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "application/pdf"
    );
    let disposition = resp
        .headers()
        .get("content-disposition")
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(
        disposition.contains("attachment") && disposition.contains("Green Valley.pdf"),
        "got: {disposition}"
    );

    let bytes = body::to_bytes(resp.into_body(), 8 * BODY_LIMIT)
        .await
        .expect("read pdf body");
    assert!(bytes.starts_with(b"%PDF"), "not a pdf: {:?}", &bytes[..8]);
}
