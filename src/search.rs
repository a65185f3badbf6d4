//! Supplier search collaborators.
//!
//! - Web lookups: a query string becomes a search-engine URL opened in the
//!   user's browser (`WebSearchLauncher`).
//! - AI lookups: a query string is sent to Gemini, which returns a text
//!   summary (`Summarizer`). Only available when switched on in config and an
//!   API key is present.
//!
//! Query phrasing is centralised here so every front end asks the same way.

use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AppConfig;
use crate::models::Producer;

const SEARCH_ENGINE_URL: &str = "https://www.google.com/search";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Nothing to search for: {0}")]
    EmptyQuery(&'static str),

    #[error("{0} is unavailable: {1}")]
    FeatureUnavailable(&'static str, &'static str),

    #[error("Could not open browser: {0}")]
    Launch(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Gemini API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse Gemini response: {0}")]
    ResponseParsing(String),
}

// ─── Query phrasing ───────────────────────────────────────────────────────────

/// Lookup for a stored producer's products.
pub fn producer_product_query(producer: &Producer) -> Result<String, SearchError> {
    let products = producer.products.trim();
    if products.is_empty() {
        return Err(SearchError::EmptyQuery("producer has no products listed"));
    }
    Ok(format!("{products} energy product"))
}

/// Supplier lookup for a keyword picked from a scanned document.
pub fn supplier_query(keyword: &str) -> Result<String, SearchError> {
    Ok(format!("{} energy suppliers", non_empty(keyword)?))
}

/// AI lookup for companies making a product.
pub fn companies_query(keyword: &str) -> Result<String, SearchError> {
    Ok(format!("companies producing {}", non_empty(keyword)?))
}

/// AI lookup for a keyword picked from a scanned document.
pub fn ai_supplier_query(keyword: &str) -> Result<String, SearchError> {
    Ok(format!("{} global energy product suppliers", non_empty(keyword)?))
}

fn non_empty(keyword: &str) -> Result<&str, SearchError> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err(SearchError::EmptyQuery("keyword is empty"));
    }
    Ok(keyword)
}

/// Search-engine URL with the query percent-encoded.
pub fn search_url(query: &str) -> Result<Url, SearchError> {
    Url::parse_with_params(SEARCH_ENGINE_URL, &[("q", query)])
        .map_err(|e| SearchError::Launch(format!("invalid search URL: {e}")))
}

// ─── Browser launcher ─────────────────────────────────────────────────────────

/// Opens a URL somewhere the user can see it.
pub trait WebSearchLauncher {
    fn open(&self, url: &Url) -> Result<(), SearchError>;
}

/// Hands the URL to the platform's default browser.
pub struct BrowserLauncher;

impl WebSearchLauncher for BrowserLauncher {
    fn open(&self, url: &Url) -> Result<(), SearchError> {
        #[cfg(target_os = "windows")]
        let mut command = {
            let mut c = std::process::Command::new("cmd");
            c.args(["/C", "start", ""]);
            c
        };
        #[cfg(target_os = "macos")]
        let mut command = std::process::Command::new("open");
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        let mut command = std::process::Command::new("xdg-open");

        command
            .arg(url.as_str())
            .spawn()
            .map_err(|e| SearchError::Launch(e.to_string()))?;
        tracing::info!(url = %url, "Opened web search");
        Ok(())
    }
}

/// Build the URL for `query` and open it.
pub fn launch_web_search(launcher: &dyn WebSearchLauncher, query: &str) -> Result<Url, SearchError> {
    let url = search_url(query)?;
    launcher.open(&url)?;
    Ok(url)
}

// ─── AI summarization ─────────────────────────────────────────────────────────

/// Produces a text summary of web results for a query.
pub trait Summarizer {
    fn summarize(&self, query: &str) -> Result<String, SearchError>;
}

pub fn summary_prompt(query: &str) -> String {
    format!("Please perform a web search for: {query}. Provide a concise summary of the top results.")
}

/// Blocking Gemini `generateContent` client.
///
/// The API key travels in the `x-goog-api-key` header, never in the URL.
pub struct GeminiClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, SearchError> {
        Self::with_base_url(GEMINI_BASE_URL, api_key, model, timeout_secs)
    }

    pub fn with_base_url(
        base_url: &str,
        api_key: &str,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self, SearchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SearchError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            timeout_secs,
        })
    }

    /// Client for AI search, or `FeatureUnavailable` when config does not allow it.
    pub fn from_config(config: &AppConfig) -> Result<Self, SearchError> {
        if !config.ai_search_enabled {
            return Err(SearchError::FeatureUnavailable(
                "AI search",
                "ai_search_enabled is false",
            ));
        }
        let key = config
            .ai_search_key()
            .ok_or(SearchError::FeatureUnavailable("AI search", "no Gemini API key configured"))?;
        Self::new(key, &config.gemini_model, config.http_timeout_secs)
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

impl Summarizer for GeminiClient {
    fn summarize(&self, query: &str) -> Result<String, SearchError> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: summary_prompt(query) }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::HttpClient(format!("Request timed out after {}s", self.timeout_secs))
                } else {
                    SearchError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|e| SearchError::ResponseParsing(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or(text);
            tracing::warn!(status = status.as_u16(), "Gemini request failed");
            return Err(SearchError::Api { status: status.as_u16(), message });
        }

        parse_summary(&text)
    }
}

/// Concatenate the text parts of the first candidate.
fn parse_summary(body: &str) -> Result<String, SearchError> {
    let parsed: GenerateResponse =
        serde_json::from_str(body).map_err(|e| SearchError::ResponseParsing(e.to_string()))?;

    let summary: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().map(|p| p.text).collect::<Vec<_>>().join(""))
        .unwrap_or_default();

    if summary.trim().is_empty() {
        return Err(SearchError::ResponseParsing("response contained no text".into()));
    }
    Ok(summary)
}

/// Ask the summarizer about `query`; returns the summary text.
pub fn ai_search(summarizer: &dyn Summarizer, query: &str) -> Result<String, SearchError> {
    let summary = summarizer.summarize(query)?;
    tracing::info!(query, chars = summary.len(), "AI search complete");
    Ok(summary)
}
