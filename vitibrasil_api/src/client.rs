//! HTTP page fetcher for the Vitibrasil statistics site.

use std::time::Duration;

use scraper::Html;
use url::Url;

use crate::{query::Query, Error};

/// Maximum number of characters of an error response body kept for diagnostics.
const BODY_EXCERPT_CHARS: usize = 500;

/// Settings the fetcher needs. All of them come from the caller's configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Site root, e.g. `http://vitibrasil.cnpuv.embrapa.br`.
    pub base_url: String,
    /// Sent as the `User-Agent` header on every request.
    pub user_agent: String,
    /// Whole-request timeout.
    pub timeout: Duration,
}

/// HTTP client for the Vitibrasil pages.
///
/// Holds one pooled `reqwest::Client`; cloning is cheap and clones share the pool,
/// so a clone can be moved into each concurrent fetch task.
#[derive(Clone, Debug)]
pub struct Client {
    base_url: String,
    http: reqwest::Client,
}

impl Client {
    /// Builds a client from the given settings. Redirects are followed with
    /// reqwest's default policy.
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::ClientBuild(e.to_string())
            })?;
        Ok(Self {
            base_url: config.base_url.clone(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_url(&self, path: &str, query: &impl Query) -> Result<Url, Error> {
        let joined = join_url(&self.base_url, path);
        let url = Url::parse(&joined).map_err(|e| {
            tracing::error!("Invalid URL constructed from {:?}: {}", joined, e);
            Error::InvalidUrl(format!("{}: {}", joined, e))
        })?;
        Ok(query.add_to_url(&url))
    }

    /// Fetches a page and returns its raw body.
    pub async fn fetch_text(&self, path: &str, query: &impl Query) -> Result<String, Error> {
        let url = self.get_url(path, query)?;
        tracing::debug!("GET {}", url);

        let resp = self
            .http
            .get(url.clone())
            .header("accept", "text/html,application/xhtml+xml")
            .header("accept-language", "pt-BR,pt;q=0.9,en;q=0.8")
            .send()
            .await
            .map_err(|e| {
                tracing::debug!("Request to {} failed: {}", url, e);
                Error::from(e)
            })?;

        let status = resp.status();
        if !status.is_success() {
            // The excerpt is best-effort; a body that fails to read must not
            // turn the status failure into a transport one.
            let body = resp.text().await.unwrap_or_default();
            let snippet = truncate_body(&body);
            tracing::error!("Request to {} failed with status {}: {}", url, status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        resp.text().await.map_err(|e| {
            tracing::debug!("Failed to read response body from {}: {}", url, e);
            Error::from(e)
        })
    }

    /// Fetches a page and parses it as an HTML document.
    ///
    /// Parsing never fails: malformed markup yields whatever tree the HTML parser
    /// recovers, possibly an empty one.
    pub async fn fetch(&self, path: &str, query: &impl Query) -> Result<Html, Error> {
        let body = self.fetch_text(path, query).await?;
        Ok(Html::parse_document(&body))
    }
}

/// Joins a base URL and a path with exactly one `/` between them.
pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(BODY_EXCERPT_CHARS) {
        None => body.to_string(),
        Some((cut, _)) => format!("{}...[truncated]", &body[..cut]),
    }
}
