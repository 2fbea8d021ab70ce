//! Pure state transition function

use super::state::RequestId;
use super::{Effect, Event, RequestState, SubmissionState};
use crate::input::is_submittable;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SubmissionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SubmissionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Reasons an event is not applied. None of these change state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Query is empty")]
    EmptyQuery,
    #[error("Response for request {request_id} superseded by request {latest}")]
    StaleResponse {
        request_id: RequestId,
        latest: RequestId,
    },
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function.
///
/// Given the same inputs it always produces the same outputs; all I/O is
/// expressed as [`Effect`]s for the runtime to execute.
pub fn transition(
    state: &SubmissionState,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match event {
        // Any state + valid Submit -> Pending. The displayed result is kept,
        // a previous failure message is dropped with the old variant.
        Event::Submit { query } => {
            if !is_submittable(&query) {
                return Err(TransitionError::EmptyQuery);
            }
            let request_id = state.latest_request + 1;
            let new_state = SubmissionState {
                request: RequestState::Pending,
                last_result: state.last_result.clone(),
                latest_request: request_id,
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::PublishState)
                .with_effect(Effect::RequestAnalysis { request_id, query }))
        }

        // Reset also retires the in-flight request id
        Event::Reset => Ok(TransitionResult::new(SubmissionState {
            request: RequestState::Idle,
            last_result: None,
            latest_request: state.latest_request + 1,
        })
        .with_effect(Effect::PublishState)),

        Event::AnalysisSucceeded { request_id, result } => {
            check_response(state, request_id)?;
            Ok(TransitionResult::new(SubmissionState {
                request: RequestState::Succeeded {
                    result: result.clone(),
                },
                last_result: Some(result),
                latest_request: state.latest_request,
            })
            .with_effect(Effect::PublishState))
        }

        Event::AnalysisFailed {
            request_id,
            message,
        } => {
            check_response(state, request_id)?;
            Ok(TransitionResult::new(SubmissionState {
                request: RequestState::failed(message),
                last_result: state.last_result.clone(),
                latest_request: state.latest_request,
            })
            .with_effect(Effect::PublishState))
        }
    }
}

/// A response applies only to the latest request, and only once
fn check_response(state: &SubmissionState, request_id: RequestId) -> Result<(), TransitionError> {
    if request_id != state.latest_request {
        return Err(TransitionError::StaleResponse {
            request_id,
            latest: state.latest_request,
        });
    }
    if !state.request.is_pending() {
        return Err(TransitionError::InvalidTransition(format!(
            "response for request {request_id} while {}",
            state.request.name()
        )));
    }
    Ok(())
}
