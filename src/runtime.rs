//! Runtime for executing submissions
//!
//! Owns the [`SubmissionState`](crate::state_machine::SubmissionState),
//! feeds events through the pure transition function and carries out the
//! resulting effects. The UI talks to it only through a
//! [`SubmissionHandle`].

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::SubmissionRuntime;

use crate::analysis::AnalysisService;
use crate::render::View;
use crate::state_machine::state::RequestId;
use crate::state_machine::Event;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch};

/// Events sent to observers of the runtime
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    StateChange {
        /// Request the view belongs to
        latest_request: RequestId,
        view: View,
    },
    /// A response arrived for a request that is no longer the latest
    ResponseDiscarded {
        request_id: RequestId,
    },
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("submission runtime has stopped")]
    Stopped,
}

/// Handle to interact with a running submission runtime
#[derive(Clone)]
pub struct SubmissionHandle {
    event_tx: mpsc::Sender<Event>,
    broadcast_tx: broadcast::Sender<RuntimeEvent>,
    view_rx: watch::Receiver<View>,
}

impl SubmissionHandle {
    /// Submit a query. Blank queries are accepted here and ignored by the
    /// state machine.
    pub async fn submit(&self, query: impl Into<String>) -> Result<(), RuntimeError> {
        self.send(Event::submit(query)).await
    }

    pub async fn reset(&self) -> Result<(), RuntimeError> {
        self.send(Event::Reset).await
    }

    async fn send(&self, event: Event) -> Result<(), RuntimeError> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| RuntimeError::Stopped)
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> broadcast::Receiver<RuntimeEvent> {
        self.broadcast_tx.subscribe()
    }

    /// Latest rendered view
    #[allow(dead_code)] // API completeness
    pub fn current(&self) -> View {
        self.view_rx.borrow().clone()
    }

    /// Receiver that wakes whenever the view changes
    pub fn watch(&self) -> watch::Receiver<View> {
        self.view_rx.clone()
    }
}

/// Start a runtime on the current tokio executor.
///
/// The runtime stops once every handle is dropped and no request is
/// outstanding.
pub fn spawn<S: AnalysisService + 'static>(service: S) -> SubmissionHandle {
    let (event_tx, event_rx) = mpsc::channel(32);
    let (broadcast_tx, _) = broadcast::channel(128);
    let (view_tx, view_rx) = watch::channel(View::default());

    let runtime = SubmissionRuntime::new(
        service,
        event_rx,
        event_tx.downgrade(),
        broadcast_tx.clone(),
        view_tx,
    );

    tokio::spawn(async move {
        runtime.run().await;
    });

    SubmissionHandle {
        event_tx,
        broadcast_tx,
        view_rx,
    }
}
