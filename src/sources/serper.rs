// Serper (Google Search) client.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::info;

use super::{SearchBackend, SearchHit};

const SERPER_ENDPOINT: &str = "https://google.serper.dev/search";
const SEARCH_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, serde::Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SearchHit>,
}

pub struct SerperClient {
    api_key: Option<String>,
    http: reqwest::Client,
}

impl SerperClient {
    pub fn new(api_key: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(SEARCH_TIMEOUT)
            .build()
            .expect("reqwest client");
        Self { api_key, http }
    }
}

#[async_trait::async_trait]
impl SearchBackend for SerperClient {
    async fn search(&self, query: &str, num: usize) -> Result<Vec<SearchHit>> {
        let Some(api_key) = self.api_key.as_deref() else {
            bail!("SERPER_API_KEY is not set in environment variables");
        };

        let body = serde_json::json!({ "q": query, "num": num });
        let resp = self
            .http
            .post(SERPER_ENDPOINT)
            .header("X-API-KEY", api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Serper API request failed")?;

        if !resp.status().is_success() {
            bail!("Serper API returned {}", resp.status());
        }

        let data: SerperResponse = resp
            .json()
            .await
            .context("Failed to parse Serper response")?;

        info!(query, count = data.organic.len(), "search complete");
        Ok(data.organic)
    }

    fn name(&self) -> &'static str {
        "serper"
    }
}
