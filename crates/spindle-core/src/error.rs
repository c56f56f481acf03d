use thiserror::Error;

use crate::domain::ProposalId;
use crate::store::StoreError;

/// Library error taxonomy.
///
/// "No work available" is not an error: claim operations return `Ok(None)`
/// for it, so transport and store faults stay distinguishable from an
/// empty queue.
#[derive(Debug, Error)]
pub enum SpindleError {
    /// Referenced proposal does not exist. Never retried.
    #[error("proposal {0} not found")]
    NotFound(ProposalId),

    /// Proposal exists but has no candidates yet (not `FINISHED`).
    #[error("candidates not found for proposal {0}")]
    CandidatesNotFound(ProposalId),

    /// Submitted result set disagrees with the requested count. The
    /// proposal is left untouched (still `CLAIMED`).
    #[error("expected {expected} candidates, got {got}")]
    CountMismatch { expected: usize, got: usize },

    /// Create-time validation failure.
    #[error("invalid proposal request: {0}")]
    InvalidRequest(String),

    /// Store unavailability surfaced through the service.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Fault while talking to the proposal service.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Fault raised by the candidate generator, captured at the isolation
    /// boundary as text.
    #[error("candidate generation failed: {0}")]
    Generation(String),
}
