//! Trade analysis collaborator
//!
//! The remote service that turns a trade description into a three-part
//! verdict. The controller only ever sees it through [`AnalysisService`].

mod error;
mod http;
mod types;

pub use error::{AnalysisError, GENERIC_FAILURE};
pub use http::HttpAnalysisService;
pub use types::AnalysisResult;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for analysis backends
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Analyze a trade description. The query is passed through untouched.
    async fn analyze(&self, query: &str) -> Result<AnalysisResult, AnalysisError>;

    /// Human-readable name of the backend, used in logs
    fn endpoint(&self) -> &str;
}

#[async_trait]
impl<T: AnalysisService + ?Sized> AnalysisService for Arc<T> {
    async fn analyze(&self, query: &str) -> Result<AnalysisResult, AnalysisError> {
        (**self).analyze(query).await
    }

    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }
}

/// Logging wrapper for analysis services
pub struct LoggingService<S> {
    inner: S,
    endpoint: String,
}

impl<S: AnalysisService> LoggingService<S> {
    pub fn new(inner: S) -> Self {
        let endpoint = inner.endpoint().to_string();
        Self { inner, endpoint }
    }
}

#[async_trait]
impl<S: AnalysisService> AnalysisService for LoggingService<S> {
    async fn analyze(&self, query: &str) -> Result<AnalysisResult, AnalysisError> {
        let start = std::time::Instant::now();
        let result = self.inner.analyze(query).await;
        let duration = start.elapsed();

        match &result {
            Ok(_) => {
                tracing::info!(
                    endpoint = %self.endpoint,
                    duration_ms = %duration.as_millis(),
                    query_len = query.len(),
                    "Trade analysis completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    endpoint = %self.endpoint,
                    duration_ms = %duration.as_millis(),
                    kind = ?e.kind,
                    error = %e.message,
                    "Trade analysis failed"
                );
            }
        }

        result
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
