//! Effects produced by state transitions

use super::state::RequestId;

/// Effects to be executed after a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Call the analysis service; its outcome comes back as an event
    /// tagged with `request_id`
    RequestAnalysis { request_id: RequestId, query: String },

    /// Push the new state to observers
    PublishState,
}
