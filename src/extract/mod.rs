//! Extraction pipeline: resolve profile URLs, scrape the sources, build the
//! prompt, invoke the model, and parse the reply into a record.
//!
//! Execution is sequential per request (resolutions, then scrapes, then one
//! model call) and stateless across requests.

pub mod parse;
pub mod prompt;
pub mod record;

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use thiserror::Error;
use tracing::{info, warn};

use crate::llm::{LlmClient, LlmError};
use crate::sources::sites::{resolve_profile_url, SiteTarget, TARGET_SITES};
use crate::sources::{PageScraper, SearchBackend};
use record::{ExtractOutcome, Extraction, SchoolRecord, SourceLinks};

/// Organic results requested per search.
const SEARCH_RESULTS: usize = 5;

/// Below this Jaro-Winkler similarity the extracted name is logged as a
/// mismatch against the query.
const NAME_MATCH_WARN_BELOW: f64 = 0.85;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("missing query parameter 'q'")]
    EmptyQuery,
    #[error("no pages found")]
    NoPagesFound,
    /// Search API/transport failure while resolving a site. Fatal for the
    /// request; never silently swallowed.
    #[error("search failed: {0}")]
    Search(anyhow::Error),
    #[error(transparent)]
    Llm(#[from] LlmError),
}

pub struct Extractor {
    search: Arc<dyn SearchBackend>,
    scraper: Arc<dyn PageScraper>,
    llm: Arc<dyn LlmClient>,
}

impl Extractor {
    pub fn new(
        search: Arc<dyn SearchBackend>,
        scraper: Arc<dyn PageScraper>,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            search,
            scraper,
            llm,
        }
    }

    /// Run the whole pipeline for one query.
    pub async fn extract(&self, query: &str) -> Result<ExtractOutcome, ExtractError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ExtractError::EmptyQuery);
        }
        counter!("extract_requests_total").increment(1);

        let resolved = self.resolve_sites(query).await?;
        if resolved.iter().all(|(_, url)| url.is_none()) {
            counter!("extract_not_found_total").increment(1);
            return Err(ExtractError::NoPagesFound);
        }

        let combined = self.scrape_sites(&resolved).await;

        let prompt = prompt::build_prompt(query, &combined);
        let t0 = Instant::now();
        let reply = self.llm.generate(&prompt).await?;
        histogram!("llm_generate_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

        let extraction = match parse::parse_extraction(&reply) {
            Some(extraction) => extraction,
            None => {
                warn!(
                    reply_len = reply.len(),
                    "model reply was not parseable JSON; using fallback record"
                );
                counter!("parse_fallback_total").increment(1);
                Extraction::Record(SchoolRecord::fallback(&combined))
            }
        };

        if let Extraction::Record(rec) = &extraction {
            check_name_match(query, &rec.school_name);
        }

        let sources: SourceLinks = resolved
            .into_iter()
            .map(|(site, url)| (site.key.to_string(), url))
            .collect();

        Ok(ExtractOutcome {
            extraction,
            sources,
        })
    }

    /// Resolve each target site in turn. A search failure is fatal; a site
    /// resolving to nothing is a normal outcome.
    async fn resolve_sites(
        &self,
        query: &str,
    ) -> Result<Vec<(&'static SiteTarget, Option<String>)>, ExtractError> {
        let mut resolved = Vec::with_capacity(TARGET_SITES.len());
        for site in TARGET_SITES.iter() {
            let phrase = format!("{query} {}", site.query_suffix);
            let hits = self
                .search
                .search(&phrase, SEARCH_RESULTS)
                .await
                .map_err(ExtractError::Search)?;
            let url = resolve_profile_url(site, &hits);
            info!(site = site.key, resolved = url.is_some(), "profile resolution");
            resolved.push((site, url));
        }
        Ok(resolved)
    }

    /// Scrape every resolved URL. A failed scrape becomes a labeled inline
    /// error block so the model still sees that the source existed; it must
    /// never block extraction from the other source.
    async fn scrape_sites(&self, resolved: &[(&'static SiteTarget, Option<String>)]) -> String {
        let mut combined = String::new();
        for (site, url) in resolved {
            let Some(url) = url else { continue };
            let t0 = Instant::now();
            match self.scraper.scrape(url).await {
                Ok(text) => {
                    combined.push_str(&format!("\n===== {} =====\n{text}", site.label));
                }
                Err(err) => {
                    warn!(site = site.key, url = %url, error = %err, "scrape failed, continuing");
                    counter!("scrape_errors_total").increment(1);
                    combined.push_str(&format!("\n===== {} (error) =====\n{err}", site.label));
                }
            }
            histogram!("scrape_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        }
        combined
    }
}

/// The containment rule ("scraped school name contains the query") stays
/// delegated to the model inside the prompt. This cross-check only makes
/// drift observable; it never alters the outcome.
fn check_name_match(query: &str, school_name: &str) {
    if school_name.is_empty() {
        return;
    }
    let q = normalize(query);
    let name = normalize(school_name);
    if name.contains(&q) {
        return;
    }
    let similarity = strsim::jaro_winkler(&q, &name);
    if similarity < NAME_MATCH_WARN_BELOW {
        warn!(
            school_name = %school_name,
            similarity,
            "extracted school name does not contain the query"
        );
    }
}

fn normalize(s: &str) -> String {
    s.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
