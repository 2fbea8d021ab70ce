//! Mock implementations for testing
//!
//! These mocks let the runtime be exercised without a network.

use super::{spawn, RuntimeEvent, SubmissionHandle};
use crate::analysis::{AnalysisError, AnalysisResult, AnalysisService};
use crate::render::View;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, oneshot};

// ============================================================================
// Mock Analysis Service
// ============================================================================

/// Analysis service that answers from a queue
pub struct MockAnalysisService {
    responses: Mutex<VecDeque<Result<AnalysisResult, AnalysisError>>>,
    /// Record of all queries received
    pub queries: Mutex<Vec<String>>,
}

impl MockAnalysisService {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_result(&self, result: AnalysisResult) {
        self.responses.lock().unwrap().push_back(Ok(result));
    }

    pub fn queue_error(&self, error: AnalysisError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl Default for MockAnalysisService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalysisService for MockAnalysisService {
    async fn analyze(&self, query: &str) -> Result<AnalysisResult, AnalysisError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AnalysisError::network("No mock response queued")))
    }

    fn endpoint(&self) -> &str {
        "mock"
    }
}

// ============================================================================
// Gated Analysis Service (for ordering tests)
// ============================================================================

type Gate = oneshot::Sender<Result<AnalysisResult, AnalysisError>>;

/// Analysis service whose calls block until the test releases them, keyed
/// by query text. Lets a test choose the order responses resolve in.
#[derive(Default)]
pub struct GatedAnalysisService {
    gates: Mutex<HashMap<String, Gate>>,
}

impl GatedAnalysisService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waiting(&self) -> usize {
        self.gates.lock().unwrap().len()
    }

    /// Wait until `count` calls are blocked on their gates
    pub async fn wait_for_waiting(&self, count: usize, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if self.waiting() >= count {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        false
    }

    /// Let the call for `query` complete with `outcome`
    pub fn release(&self, query: &str, outcome: Result<AnalysisResult, AnalysisError>) {
        let gate = self
            .gates
            .lock()
            .unwrap()
            .remove(query)
            .expect("no call waiting for that query");
        gate.send(outcome).expect("caller went away");
    }
}

#[async_trait]
impl AnalysisService for GatedAnalysisService {
    async fn analyze(&self, query: &str) -> Result<AnalysisResult, AnalysisError> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(query.to_string(), tx);
        rx.await
            .unwrap_or_else(|_| Err(AnalysisError::network("gate dropped")))
    }

    fn endpoint(&self) -> &str {
        "gated"
    }
}

// ============================================================================
// Panicking Analysis Service
// ============================================================================

/// Analysis service whose calls crash
pub struct PanickingAnalysisService;

#[async_trait]
impl AnalysisService for PanickingAnalysisService {
    async fn analyze(&self, _query: &str) -> Result<AnalysisResult, AnalysisError> {
        panic!("analysis backend crashed");
    }

    fn endpoint(&self) -> &str {
        "panicking"
    }
}

// ============================================================================
// Test Runtime
// ============================================================================

/// Running runtime plus an event subscription taken before any input
pub struct TestRuntime<S> {
    pub handle: SubmissionHandle,
    pub events: broadcast::Receiver<RuntimeEvent>,
    pub service: Arc<S>,
}

impl<S: AnalysisService + 'static> TestRuntime<S> {
    pub fn new(service: S) -> Self {
        let service = Arc::new(service);
        let handle = spawn(service.clone());
        let events = handle.subscribe();
        Self {
            handle,
            events,
            service,
        }
    }

    pub async fn submit(&self, query: &str) {
        self.handle.submit(query).await.expect("runtime stopped");
    }

    /// Wait for the next published view matching `pred`
    pub async fn wait_for_view(
        &mut self,
        pred: impl Fn(&View) -> bool,
        timeout: Duration,
    ) -> Option<View> {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            match tokio::time::timeout(Duration::from_millis(50), self.events.recv()).await {
                Ok(Ok(RuntimeEvent::StateChange { view, .. })) if pred(&view) => return Some(view),
                _ => continue,
            }
        }
        None
    }

    /// Wait for the view to leave the loading state
    pub async fn wait_for_settled(&mut self, timeout: Duration) -> Option<View> {
        self.wait_for_view(|v| !v.is_loading, timeout).await
    }

    /// Wait for the runtime to drop the response of `request_id`
    pub async fn wait_for_discard(&mut self, request_id: u64, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            match tokio::time::timeout(Duration::from_millis(50), self.events.recv()).await {
                Ok(Ok(RuntimeEvent::ResponseDiscarded { request_id: id })) if id == request_id => {
                    return true
                }
                _ => continue,
            }
        }
        false
    }

    /// Next state change, if one arrives within `timeout`
    pub async fn next_state_change(&mut self, timeout: Duration) -> Option<RuntimeEvent> {
        match tokio::time::timeout(timeout, self.events.recv()).await {
            Ok(Ok(event @ RuntimeEvent::StateChange { .. })) => Some(event),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::GENERIC_FAILURE;

    const WAIT: Duration = Duration::from_secs(2);

    fn abc() -> AnalysisResult {
        AnalysisResult::new("A", "B", "C")
    }

    #[tokio::test]
    async fn test_mock_service_queue() {
        let mock = MockAnalysisService::new();
        mock.queue_result(abc());

        assert_eq!(mock.analyze("q1").await.unwrap(), abc());
        // Second call should fail (no more responses)
        assert!(mock.analyze("q2").await.is_err());
        assert_eq!(mock.recorded_queries(), vec!["q1", "q2"]);
    }

    /// Scenario: AAPL query, collaborator answers {A, B, C}
    #[tokio::test]
    async fn test_successful_submission() {
        let mock = MockAnalysisService::new();
        mock.queue_result(abc());
        let mut rt = TestRuntime::new(mock);

        rt.submit("Buy 100 shares of AAPL at $200").await;

        let view = rt.wait_for_settled(WAIT).await.expect("no outcome");
        assert_eq!(
            view,
            View {
                is_loading: false,
                error: None,
                result: Some(abc()),
            }
        );
        assert_eq!(rt.handle.current(), view);
        assert_eq!(
            rt.service.recorded_queries(),
            vec!["Buy 100 shares of AAPL at $200"]
        );
    }

    /// Pending is published before the collaborator has answered
    #[tokio::test]
    async fn test_pending_visible_before_response() {
        let mut rt = TestRuntime::new(GatedAnalysisService::new());

        rt.submit("Buy 10 MSFT").await;
        let pending = rt.wait_for_view(|v| v.is_loading, WAIT).await;
        assert!(pending.is_some());
        assert!(rt.service.wait_for_waiting(1, WAIT).await);
        assert!(rt.handle.current().is_loading);

        rt.service.release("Buy 10 MSFT", Ok(abc()));
        let view = rt.wait_for_settled(WAIT).await.expect("no outcome");
        assert_eq!(view.result, Some(abc()));
    }

    /// Scenario: whitespace-only query issues nothing
    #[tokio::test]
    async fn test_blank_submission_is_ignored() {
        let mock = MockAnalysisService::new();
        mock.queue_result(abc());
        let mut rt = TestRuntime::new(mock);

        rt.submit("  ").await;
        assert!(rt.next_state_change(Duration::from_millis(100)).await.is_none());
        assert_eq!(rt.handle.current(), View::default());

        // The blank submit did not consume a request id
        rt.submit("Buy 1 AAPL").await;
        match rt.next_state_change(WAIT).await {
            Some(RuntimeEvent::StateChange {
                latest_request,
                view,
            }) => {
                assert!(view.is_loading);
                assert_eq!(latest_request, 1);
            }
            other => panic!("expected pending state, got {other:?}"),
        }
        rt.wait_for_settled(WAIT).await.expect("no outcome");
        assert_eq!(rt.service.recorded_queries(), vec!["Buy 1 AAPL"]);
    }

    /// Scenario: 500 after an earlier success keeps the old result on display
    #[tokio::test]
    async fn test_failure_after_success_retains_result() {
        let mock = MockAnalysisService::new();
        mock.queue_result(abc());
        mock.queue_error(AnalysisError::status(500));
        let mut rt = TestRuntime::new(mock);

        rt.submit("Buy 1 AAPL").await;
        rt.wait_for_settled(WAIT).await.expect("no first outcome");

        rt.submit("Buy 2 AAPL").await;
        let pending = rt.wait_for_view(|v| v.is_loading, WAIT).await.expect("no pending");
        assert_eq!(pending.result, Some(abc()));

        let view = rt.wait_for_settled(WAIT).await.expect("no second outcome");
        let error = view.error.expect("expected error");
        assert!(!error.is_empty());
        assert_eq!(view.result, Some(abc()));
    }

    #[tokio::test]
    async fn test_resubmit_after_failure_clears_error() {
        let mock = MockAnalysisService::new();
        mock.queue_error(AnalysisError::network("Connection refused"));
        mock.queue_result(abc());
        let mut rt = TestRuntime::new(mock);

        rt.submit("Buy 1 AAPL").await;
        let failed = rt.wait_for_settled(WAIT).await.expect("no outcome");
        assert_eq!(failed.error.as_deref(), Some("Connection refused"));

        rt.submit("Buy 1 AAPL").await;
        let pending = rt.wait_for_view(|v| v.is_loading, WAIT).await.expect("no pending");
        assert_eq!(pending.error, None);

        let view = rt.wait_for_settled(WAIT).await.expect("no outcome");
        assert_eq!(view.error, None);
        assert_eq!(view.result, Some(abc()));
    }

    /// Race: A issued first, B second; B resolves first, then A. A's late
    /// answer is discarded, so the newest request decides the outcome.
    /// Without request ids the final state would be A's result.
    #[tokio::test]
    async fn test_late_response_from_superseded_request_is_discarded() {
        let mut rt = TestRuntime::new(GatedAnalysisService::new());
        let result_a = AnalysisResult::new("A-trade", "A-risk", "A-decision");
        let result_b = AnalysisResult::new("B-trade", "B-risk", "B-decision");

        rt.submit("query A").await;
        rt.submit("query B").await;
        assert!(rt.service.wait_for_waiting(2, WAIT).await);

        rt.service.release("query B", Ok(result_b.clone()));
        let view = rt.wait_for_settled(WAIT).await.expect("no outcome for B");
        assert_eq!(view.result, Some(result_b.clone()));

        rt.service.release("query A", Ok(result_a));
        assert!(rt.wait_for_discard(1, WAIT).await);

        assert_eq!(
            rt.handle.current(),
            View {
                is_loading: false,
                error: None,
                result: Some(result_b),
            }
        );
    }

    /// A superseded request failing does not surface its error either
    #[tokio::test]
    async fn test_late_failure_from_superseded_request_is_discarded() {
        let mut rt = TestRuntime::new(GatedAnalysisService::new());

        rt.submit("query A").await;
        rt.submit("query B").await;
        assert!(rt.service.wait_for_waiting(2, WAIT).await);

        rt.service.release("query A", Err(AnalysisError::status(502)));
        assert!(rt.wait_for_discard(1, WAIT).await);
        assert!(rt.handle.current().is_loading);

        rt.service.release("query B", Ok(abc()));
        let view = rt.wait_for_settled(WAIT).await.expect("no outcome for B");
        assert_eq!(view.error, None);
        assert_eq!(view.result, Some(abc()));
    }

    /// Loading always ends, even when the backend crashes
    #[tokio::test]
    async fn test_panicking_service_surfaces_failure() {
        let mut rt = TestRuntime::new(PanickingAnalysisService);

        rt.submit("Buy 1 AAPL").await;
        let view = rt.wait_for_settled(WAIT).await.expect("pending never ended");
        assert_eq!(view.error.as_deref(), Some(GENERIC_FAILURE));
        assert_eq!(view.result, None);
    }

    #[tokio::test]
    async fn test_reset_clears_view_and_ignores_in_flight_response() {
        let mut rt = TestRuntime::new(GatedAnalysisService::new());

        rt.submit("query A").await;
        assert!(rt.service.wait_for_waiting(1, WAIT).await);

        rt.handle.reset().await.unwrap();
        let view = rt.wait_for_settled(WAIT).await.expect("no reset");
        assert_eq!(view, View::default());

        rt.service.release("query A", Ok(abc()));
        assert!(rt.wait_for_discard(1, WAIT).await);
        assert_eq!(rt.handle.current(), View::default());
    }
}
