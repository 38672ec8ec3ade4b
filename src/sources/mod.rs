//! Outbound content sources: web search resolution and page scraping.
//!
//! Both collaborators sit behind async traits so the extraction pipeline
//! can be exercised in tests without touching the network.

pub mod scrape;
pub mod serper;
pub mod sites;

use anyhow::Result;

/// One organic search result. Ads/sponsored entries never reach this type;
/// only the organic list is deserialized.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub snippet: String,
}

/// Web search collaborator.
#[async_trait::async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run one search and return the organic results in rank order.
    async fn search(&self, query: &str, num: usize) -> Result<Vec<SearchHit>>;
    fn name(&self) -> &'static str;
}

/// Page scraping collaborator: fetch a URL and reduce it to LLM-ready text.
#[async_trait::async_trait]
pub trait PageScraper: Send + Sync {
    async fn scrape(&self, url: &str) -> Result<String>;
}
