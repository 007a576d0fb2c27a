//! Web search — best-effort topical context for the research stage.
//!
//! Fetches the DuckDuckGo HTML endpoint and flattens the page to plain text
//! with a tag strip and whitespace fold. No DOM parsing or selector logic:
//! the flattened text only seeds the research prompt, and a failed or junk
//! result degrades upstream to fallback research.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

const SEARCH_URL: &str = "https://html.duckduckgo.com/html/";
const USER_AGENT: &str = "Mozilla/5.0 (compatible; herald/0.1)";
/// Flattened search text is capped before it reaches the research prompt.
const MAX_SNIPPET_CHARS: usize = 2000;

static SCRIPT_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)>").expect("valid regex")
});
static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search returned status {0}")]
    Status(u16),
}

/// Anything that can turn a query into a blob of topical text.
///
/// Production: `DuckDuckGoSearch`. Tests: canned stubs.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<String, SearchError>;
}

#[derive(Clone)]
pub struct DuckDuckGoSearch {
    client: Client,
}

impl DuckDuckGoSearch {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .user_agent(USER_AGENT)
                .build()
                .expect("Failed to build HTTP client"),
        }
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    async fn search(&self, query: &str) -> Result<String, SearchError> {
        let response = self
            .client
            .get(SEARCH_URL)
            .query(&[("q", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }

        let html = response.text().await?;
        let text = flatten_html(&html);

        debug!(
            "search for '{query}' flattened to {} chars",
            text.chars().count()
        );

        Ok(text)
    }
}

/// Drops script/style blocks, strips the remaining tags, folds whitespace,
/// and truncates to `MAX_SNIPPET_CHARS`.
fn flatten_html(html: &str) -> String {
    let without_blocks = SCRIPT_STYLE.replace_all(html, " ");
    let stripped = HTML_TAG.replace_all(&without_blocks, " ");
    let flattened = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

    if flattened.chars().count() > MAX_SNIPPET_CHARS {
        flattened.chars().take(MAX_SNIPPET_CHARS).collect()
    } else {
        flattened
    }
}
