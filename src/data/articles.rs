//! Client for the newspaper article endpoint.
//!
//! The endpoint answers `GET {endpoint}/{YYYY[/MM]}/?{api_query}` with a list of
//! matching articles. It was built for JSONP consumers, so a body wrapped in a
//! callback is accepted as well as plain JSON.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::blocking::Client;
use serde::Deserialize;
use url::Url;

use crate::domain::{Article, ArticleOutcome, ArticleRequest, QueryDate};
use crate::error::AppError;

pub const DEFAULT_ENDPOINT: &str = "http://wraggelabs.appspot.com/api/newspapers/articles";

/// Environment variable (or `.env` entry) overriding [`DEFAULT_ENDPOINT`].
pub const ENDPOINT_ENV: &str = "TROVE_ARTICLES_ENDPOINT";

/// Upstream error text meaning Trove did not answer in time.
pub const TIMEOUT_SIGNATURE: &str = "An error occurred: ApplicationError: 5";

pub const TIMEOUT_MESSAGE: &str =
    "Sorry, Trove took too long to respond. Use the link below to query Trove directly.";

/// Characters `encodeURI` escapes; URI delimiters (`& = ? / : # + ,` ...) pass through.
const ENCODE_URI: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

#[derive(Debug, Clone)]
pub struct ArticleClient {
    client: Client,
    endpoint: String,
}

impl ArticleClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, AppError> {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Url::parse(&endpoint)
            .map_err(|e| AppError::input(format!("Invalid article endpoint '{endpoint}': {e}")))?;
        Ok(Self {
            client: Client::new(),
            endpoint,
        })
    }

    /// Resolve the endpoint: explicit override, then `TROVE_ARTICLES_ENDPOINT`
    /// (environment or `.env`), then the built-in default.
    pub fn from_env(endpoint_override: Option<&str>) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let endpoint = match endpoint_override {
            Some(endpoint) => endpoint.to_string(),
            None => std::env::var(ENDPOINT_ENV).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
        };
        tracing::debug!(endpoint = %endpoint, "article endpoint resolved");
        Self::new(endpoint)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Request URL for one chart point; the query part is escaped like `encodeURI`.
    pub fn request_url(&self, query_date: QueryDate, api_query: &str) -> Result<Url, AppError> {
        let query = utf8_percent_encode(api_query, ENCODE_URI);
        let raw = format!("{}/{query_date}/?{query}", self.endpoint);
        Url::parse(&raw).map_err(|e| AppError::input(format!("Invalid article URL '{raw}': {e}")))
    }

    pub fn fetch(&self, request: &ArticleRequest) -> Result<ArticleOutcome, AppError> {
        let url = self.request_url(request.query_date, &request.api_query)?;
        tracing::info!(
            series = %request.label,
            query_date = %request.query_date,
            url = %url,
            "fetching articles"
        );

        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| AppError::network(format!("Article request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::network(format!(
                "Article request failed with status {}.",
                resp.status()
            )));
        }

        let body = resp
            .text()
            .map_err(|e| AppError::network(format!("Failed to read article response: {e}")))?;
        let outcome = parse_response(&body)?;

        match &outcome {
            ArticleOutcome::Found { articles, .. } => {
                tracing::info!(count = articles.len(), query_date = %request.query_date, "articles received");
            }
            ArticleOutcome::TimedOut { .. } => {
                tracing::warn!(query_date = %request.query_date, "upstream search timed out");
            }
            ArticleOutcome::NoResults { upstream_error, .. } => {
                tracing::info!(query_date = %request.query_date, error = ?upstream_error, "no articles");
            }
        }
        Ok(outcome)
    }
}

#[derive(Debug, Deserialize)]
struct ArticlesResponse {
    #[serde(default)]
    results: Vec<Article>,
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Decode and classify an endpoint response body.
pub fn parse_response(body: &str) -> Result<ArticleOutcome, AppError> {
    let body: ArticlesResponse = serde_json::from_str(strip_jsonp(body))
        .map_err(|e| AppError::network(format!("Failed to parse article response: {e}")))?;

    let more_url = body.query.filter(|q| !q.trim().is_empty());
    if !body.results.is_empty() {
        return Ok(ArticleOutcome::Found {
            articles: body.results,
            more_url,
        });
    }

    match body.error {
        Some(err) if err.trim() == TIMEOUT_SIGNATURE => Ok(ArticleOutcome::TimedOut { more_url }),
        upstream_error => Ok(ArticleOutcome::NoResults {
            more_url,
            upstream_error: upstream_error.filter(|e| !e.trim().is_empty()),
        }),
    }
}

/// Unwrap `callback({...});` to `{...}`; plain JSON passes through.
fn strip_jsonp(body: &str) -> &str {
    let trimmed = body.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return trimmed;
    }
    match (trimmed.find('('), trimmed.rfind(')')) {
        (Some(open), Some(close)) if open < close => trimmed[open + 1..close].trim(),
        _ => trimmed,
    }
}
