//! Submission runtime executor

use super::RuntimeEvent;
use crate::analysis::{AnalysisService, GENERIC_FAILURE};
use crate::render::{render, View};
use crate::state_machine::state::RequestId;
use crate::state_machine::{transition, Effect, Event, SubmissionState, TransitionError};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};

/// Event loop around the submission state machine, generic over the
/// analysis backend so tests can inject mocks
pub struct SubmissionRuntime<S: AnalysisService + 'static> {
    state: SubmissionState,
    service: Arc<S>,
    event_rx: mpsc::Receiver<Event>,
    /// Weak so the loop ends once the UI's handles are gone
    event_tx: mpsc::WeakSender<Event>,
    broadcast_tx: broadcast::Sender<RuntimeEvent>,
    view_tx: watch::Sender<View>,
}

impl<S: AnalysisService + 'static> SubmissionRuntime<S> {
    pub fn new(
        service: S,
        event_rx: mpsc::Receiver<Event>,
        event_tx: mpsc::WeakSender<Event>,
        broadcast_tx: broadcast::Sender<RuntimeEvent>,
        view_tx: watch::Sender<View>,
    ) -> Self {
        Self {
            state: SubmissionState::new(),
            service: Arc::new(service),
            event_rx,
            event_tx,
            broadcast_tx,
            view_tx,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(endpoint = %self.service.endpoint(), "Starting submission runtime");

        while let Some(event) = self.event_rx.recv().await {
            self.process_event(event);
        }

        tracing::info!("Submission runtime stopped");
    }

    fn process_event(&mut self, event: Event) {
        let result = match transition(&self.state, event) {
            Ok(r) => r,
            Err(TransitionError::EmptyQuery) => {
                tracing::debug!("Ignoring blank submission");
                return;
            }
            Err(TransitionError::StaleResponse { request_id, latest }) => {
                tracing::info!(request_id, latest, "Discarding superseded response");
                let _ = self
                    .broadcast_tx
                    .send(RuntimeEvent::ResponseDiscarded { request_id });
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Rejected event");
                return;
            }
        };

        let old_state = std::mem::replace(&mut self.state, result.new_state);
        tracing::debug!(
            from = old_state.request.name(),
            to = self.state.request.name(),
            latest_request = self.state.latest_request,
            "State transition"
        );

        for effect in result.effects {
            self.execute_effect(effect);
        }
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::PublishState => {
                let view = render(&self.state);
                self.view_tx.send_replace(view.clone());
                let _ = self.broadcast_tx.send(RuntimeEvent::StateChange {
                    latest_request: self.state.latest_request,
                    view,
                });
            }
            Effect::RequestAnalysis { request_id, query } => {
                self.spawn_request(request_id, query);
            }
        }
    }

    /// Run the collaborator call in its own task. Exactly one completion
    /// event is sent per request, including when the call panics, so the
    /// pending state always ends.
    fn spawn_request(&self, request_id: RequestId, query: String) {
        let Some(event_tx) = self.event_tx.upgrade() else {
            tracing::debug!(request_id, "UI gone, skipping analysis request");
            return;
        };
        let service = self.service.clone();

        tokio::spawn(async move {
            tracing::info!(request_id, "Requesting trade analysis");

            let call = tokio::spawn(async move { service.analyze(&query).await });
            let event = match call.await {
                Ok(Ok(result)) => Event::AnalysisSucceeded { request_id, result },
                Ok(Err(e)) => Event::AnalysisFailed {
                    request_id,
                    message: e.message,
                },
                Err(e) => {
                    tracing::error!(request_id, error = %e, "Analysis task aborted");
                    Event::AnalysisFailed {
                        request_id,
                        message: GENERIC_FAILURE.to_string(),
                    }
                }
            };

            if event_tx.send(event).await.is_err() {
                tracing::debug!(request_id, "Runtime stopped before response was applied");
            }
        });
    }
}
