//! Projection from submission state to what the form shows

use crate::analysis::AnalysisResult;
use crate::state_machine::{RequestState, SubmissionState};

/// Displayable snapshot of the submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct View {
    pub is_loading: bool,
    pub error: Option<String>,
    pub result: Option<AnalysisResult>,
}

impl View {
    /// Titled result panels, in display order
    pub fn sections(&self) -> Vec<(&'static str, &str)> {
        self.result
            .as_ref()
            .map(|r| {
                vec![
                    ("Trading Analysis", r.trade_analysis.as_str()),
                    ("Risk Analysis", r.risk_analysis.as_str()),
                    ("Final Decision", r.final_decision.as_str()),
                ]
            })
            .unwrap_or_default()
    }
}

pub fn render(state: &SubmissionState) -> View {
    View {
        is_loading: state.request.is_pending(),
        error: match &state.request {
            RequestState::Failed { message } => Some(message.clone()),
            _ => None,
        },
        result: state.last_result.clone(),
    }
}
