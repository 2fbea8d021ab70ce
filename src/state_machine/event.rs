//! Events that drive the submission state machine

use super::state::RequestId;
use crate::analysis::AnalysisResult;

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // User events
    Submit {
        query: String,
    },
    Reset,

    // Collaborator events
    AnalysisSucceeded {
        request_id: RequestId,
        result: AnalysisResult,
    },
    AnalysisFailed {
        request_id: RequestId,
        message: String,
    },
}

impl Event {
    pub fn submit(query: impl Into<String>) -> Self {
        Event::Submit {
            query: query.into(),
        }
    }
}
