//! Page scraping: fetch a profile page with a browser-like request
//! signature and reduce its HTML to ordered plain-text pieces an LLM can
//! digest.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node, Selector};

use super::PageScraper;

const FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Blocks with this much trimmed text or less are navigation/button noise.
const MIN_BLOCK_CHARS: usize = 40;

static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").expect("h1 selector"));
static LD_JSON: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("ld+json selector")
});
static TEXT_BLOCKS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p, li, td, th, div").expect("block selector"));

pub struct HttpScraper {
    http: reqwest::Client,
}

impl HttpScraper {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .expect("reqwest client");
        Self { http }
    }
}

impl Default for HttpScraper {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PageScraper for HttpScraper {
    async fn scrape(&self, url: &str) -> Result<String> {
        let resp = self
            .http
            .get(url)
            .header(
                "User-Agent",
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)",
            )
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.5")
            .header("Referer", "https://www.google.com/")
            .send()
            .await
            .with_context(|| format!("fetching {url}"))?;

        if !resp.status().is_success() {
            bail!("fetch of {url} returned {}", resp.status());
        }

        let html = resp.text().await.context("reading response body")?;
        Ok(page_text(&html))
    }
}

/// Reduce an HTML document to blank-line-joined text pieces, in document
/// order: the first `h1` as a title line, every parseable ld+json block
/// re-serialized compactly, then every substantive text block.
pub fn page_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut pieces: Vec<String> = Vec::new();

    if let Some(h1) = doc.select(&H1).next() {
        let title = visible_text(h1);
        if !title.is_empty() {
            pieces.push(format!("Title: {title}"));
        }
    }

    for script in doc.select(&LD_JSON) {
        let raw: String = script.text().collect();
        // Unparseable structured data is skipped; partial data is acceptable.
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&raw) {
            pieces.push(value.to_string());
        }
    }

    for block in doc.select(&TEXT_BLOCKS) {
        let text = visible_text(block);
        if text.chars().count() > MIN_BLOCK_CHARS {
            pieces.push(text);
        }
    }

    pieces.join("\n\n")
}

/// Text of an element with `script`/`style`/`noscript` subtrees skipped:
/// trimmed text nodes joined by single spaces.
fn visible_text(el: ElementRef<'_>) -> String {
    let mut parts: Vec<&str> = Vec::new();
    collect_text(*el, &mut parts);
    parts.join(" ")
}

fn collect_text<'a>(node: NodeRef<'a, Node>, parts: &mut Vec<&'a str>) {
    if let Some(el) = node.value().as_element() {
        if matches!(el.name(), "script" | "style" | "noscript") {
            return;
        }
    }
    if let Some(text) = node.value().as_text() {
        let t = text.trim();
        if !t.is_empty() {
            parts.push(t);
        }
    }
    for child in node.children() {
        collect_text(child, parts);
    }
}
