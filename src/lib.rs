// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod config;
pub mod extract;
pub mod llm;
pub mod metrics;
pub mod pdf;
pub mod sources;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::extract::record::{ExtractOutcome, Extraction, SchoolRecord};
pub use crate::extract::{ExtractError, Extractor};

use axum::Router;

/// Build the full in-process application Router the way the binary does:
/// configuration from the environment, real Serper/Gemini clients, and the
/// `/metrics` exposition route when `DEBUG_ROUTES=1`.
pub async fn app() -> anyhow::Result<Router> {
    let cfg = config::AppConfig::from_env();
    cfg.log_startup();

    let state = api::AppState::from_config(&cfg);
    let mut router = api::router(state);

    if std::env::var("DEBUG_ROUTES").ok().as_deref() == Some("1") {
        let exposition = crate::metrics::Metrics::init();
        router = router.merge(exposition.router());
    }

    Ok(router)
}
