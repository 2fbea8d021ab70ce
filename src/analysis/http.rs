//! HTTP implementation of the analysis collaborator

use super::types::{AnalysisResult, TradeRequest};
use super::{AnalysisError, AnalysisService};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const ANALYZE_PATH: &str = "/analyze-trade";

/// Talks to `POST {base_url}/analyze-trade`
pub struct HttpAnalysisService {
    client: Client,
    url: String,
}

impl HttpAnalysisService {
    /// Create a client for the service rooted at `base_url`. Without a
    /// timeout a request runs until the transport itself gives up.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, AnalysisError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AnalysisError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: format!("{}{ANALYZE_PATH}", base_url.trim_end_matches('/')),
        })
    }

    fn classify_send_error(e: &reqwest::Error) -> AnalysisError {
        if e.is_timeout() {
            AnalysisError::network(format!("Request timeout: {e}"))
        } else if e.is_connect() {
            AnalysisError::network(format!("Could not reach analysis service: {e}"))
        } else {
            AnalysisError::network(format!("Request failed: {e}"))
        }
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisService {
    async fn analyze(&self, query: &str) -> Result<AnalysisResult, AnalysisError> {
        let request = TradeRequest {
            trade_details: query.to_string(),
        };

        let response = self
            .client
            .post(&self.url)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| Self::classify_send_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), url = %self.url, "Analysis service rejected request");
            return Err(AnalysisError::status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AnalysisError::network(format!("Failed to read response: {e}")))?;

        serde_json::from_str::<AnalysisResult>(&body)
            .map_err(|e| AnalysisError::shape(format!("Malformed analysis response: {e}")))
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}
