//! Wire types for the `/analyze-trade` endpoint

use serde::{Deserialize, Serialize};

/// Request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRequest {
    pub trade_details: String,
}

/// Three-part verdict returned by the analysis service.
///
/// All three fields are required strings: a body missing any of them, or
/// carrying `null` or a non-string value, fails to deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub trade_analysis: String,
    pub risk_analysis: String,
    pub final_decision: String,
}

impl AnalysisResult {
    #[allow(dead_code)] // Responses are built by serde; used by tests
    pub fn new(
        trade_analysis: impl Into<String>,
        risk_analysis: impl Into<String>,
        final_decision: impl Into<String>,
    ) -> Self {
        Self {
            trade_analysis: trade_analysis.into(),
            risk_analysis: risk_analysis.into(),
            final_decision: final_decision.into(),
        }
    }
}
