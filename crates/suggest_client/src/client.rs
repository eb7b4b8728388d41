//! Autocomplete HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required). Hosts call
//! `fetch_all` from a worker thread so the input stays responsive.

use std::time::Duration;

use log::{debug, warn};
use tagcalc_engine::{Suggestion, SuggestionSource};

/// Autocomplete API client (blocking).
#[derive(Clone)]
pub struct SuggestClient {
    http: reqwest::blocking::Client,
    endpoint: String,
}

/// Error type for suggestion fetches.
#[derive(Debug)]
pub enum SuggestError {
    /// Could not build the client or reach the server
    Network(String),
    /// HTTP error with status code
    Http(u16, String),
    /// Response was not a suggestion list
    Parse(String),
    /// Local suggestion file could not be read
    Io(String),
}

impl std::fmt::Display for SuggestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestError::Network(msg) => write!(f, "Network error: {}", msg),
            SuggestError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            SuggestError::Parse(msg) => write!(f, "Parse error: {}", msg),
            SuggestError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for SuggestError {}

impl SuggestClient {
    /// Create a client for `endpoint` (scheme + host, optional path prefix).
    /// `timeout: None` waits indefinitely.
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self, SuggestError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("tagcalc/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| SuggestError::Network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// URL of the autocomplete resource.
    pub fn autocomplete_url(&self) -> String {
        format!("{}/autocomplete", self.endpoint)
    }

    /// Fetch the complete suggestion list (empty `query` parameter).
    pub fn fetch_all(&self) -> Result<Vec<Suggestion>, SuggestError> {
        let url = self.autocomplete_url();
        debug!("fetching suggestions from {}", url);

        let response = self.http.get(&url)
            .query(&[("query", "")])
            .send()
            .map_err(|e| SuggestError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().unwrap_or_default();
            warn!("suggestion endpoint returned HTTP {}", status);
            return Err(SuggestError::Http(status, body));
        }

        let body = response.text().map_err(|e| SuggestError::Network(e.to_string()))?;
        let list = parse_suggestions(&body)?;
        debug!("received {} suggestions", list.len());
        Ok(list)
    }
}

impl SuggestionSource for SuggestClient {
    type Error = SuggestError;

    fn fetch_all(&self) -> Result<Vec<Suggestion>, SuggestError> {
        SuggestClient::fetch_all(self)
    }
}

/// Decode a suggestion list from JSON text.
pub(crate) fn parse_suggestions(body: &str) -> Result<Vec<Suggestion>, SuggestError> {
    serde_json::from_str(body).map_err(|e| SuggestError::Parse(e.to_string()))
}
