//! Submission state types

use crate::analysis::{AnalysisResult, GENERIC_FAILURE};
use serde::{Deserialize, Serialize};

/// Identifier of an issued request. Strictly increasing per runtime.
pub type RequestId = u64;

/// Lifecycle of the most recent submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestState {
    /// Nothing submitted yet, or the form was reset
    #[default]
    Idle,

    /// A request is in flight
    Pending,

    /// The latest request produced a complete analysis
    Succeeded { result: AnalysisResult },

    /// The latest request failed. `message` is never empty.
    Failed { message: String },
}

impl RequestState {
    /// Build a `Failed` state, substituting the generic message for a blank one
    pub fn failed(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            RequestState::Failed {
                message: GENERIC_FAILURE.to_string(),
            }
        } else {
            RequestState::Failed { message }
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, RequestState::Pending)
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            RequestState::Idle => "idle",
            RequestState::Pending => "pending",
            RequestState::Succeeded { .. } => "succeeded",
            RequestState::Failed { .. } => "failed",
        }
    }
}

/// Everything the submission controller owns
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SubmissionState {
    pub request: RequestState,
    /// Result on display: the most recently applied success. Survives
    /// `Pending` and `Failed`; replaced by the next success, dropped on reset.
    pub last_result: Option<AnalysisResult>,
    /// Id of the most recently issued request (0 before the first).
    /// Responses carrying any other id are stale.
    pub latest_request: RequestId,
}

impl SubmissionState {
    pub fn new() -> Self {
        Self::default()
    }
}
