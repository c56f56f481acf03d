//! Proposal service: stateless logic layer over the store.
//!
//! Enforces the state machine (`CREATED -> CLAIMED -> FINISHED | FAILED`)
//! and the claim protocol. All mutation of proposal records goes through
//! here; nothing else reads-then-writes a store record.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::domain::{Candidates, Proposal, ProposalId, ProposalRequest, ProposalState};
use crate::error::SpindleError;
use crate::observability::ProposalCounts;
use crate::store::{ProposalStore, ProposalUpdate};

pub struct ProposalService {
    store: Arc<dyn ProposalStore>,
}

impl ProposalService {
    pub fn new(store: Arc<dyn ProposalStore>) -> Self {
        Self { store }
    }

    /// Create a `CREATED` proposal and persist it. Returns the persisted
    /// record including its assigned id.
    pub async fn create(&self, request: ProposalRequest) -> Result<Proposal, SpindleError> {
        if request.n_candidates == 0 {
            return Err(SpindleError::InvalidRequest(
                "n_candidates must be positive".to_string(),
            ));
        }
        if request.pendings.is_some() {
            return Err(SpindleError::InvalidRequest(
                "pendings must be none for proposals".to_string(),
            ));
        }

        let proposal = Proposal::from_request(ProposalId::new(0), request, Utc::now());
        let id = self.store.insert(proposal.clone()).await?;

        // The store only assigns the id: the local record plus that id is
        // the persisted state, with no read that a concurrent claimer
        // could race.
        let persisted = Proposal { id, ..proposal };

        info!(proposal_id = %id, n_candidates = persisted.n_candidates, "proposal created");
        Ok(persisted)
    }

    /// All proposals, order not significant.
    pub async fn list(&self) -> Result<Vec<Proposal>, SpindleError> {
        Ok(self.store.all().await?)
    }

    pub async fn get(&self, id: ProposalId) -> Result<Proposal, SpindleError> {
        self.store
            .get(id)
            .await?
            .ok_or(SpindleError::NotFound(id))
    }

    /// Candidates of a finished proposal. Errors when the proposal is
    /// missing or has not produced candidates yet.
    pub async fn get_candidates(&self, id: ProposalId) -> Result<Candidates, SpindleError> {
        let proposal = self.get(id).await?;
        proposal
            .candidates
            .ok_or(SpindleError::CandidatesNotFound(id))
    }

    pub async fn get_state(&self, id: ProposalId) -> Result<ProposalState, SpindleError> {
        Ok(self.get(id).await?.state)
    }

    /// Claim the first `CREATED` proposal (lowest id).
    ///
    /// `Ok(None)` means no work available, which is not an error. The
    /// select-and-transition is atomic at the store layer, so concurrent
    /// claims can never hand the same proposal to two workers.
    pub async fn claim(&self) -> Result<Option<Proposal>, SpindleError> {
        let claimed = self.store.claim_next(Utc::now()).await?;
        match &claimed {
            Some(p) => info!(proposal_id = %p.id, "proposal claimed"),
            None => debug!("no proposal to claim"),
        }
        Ok(claimed)
    }

    /// Store the result set and finish the proposal.
    ///
    /// Rejects a row count that disagrees with `n_candidates` and leaves
    /// the proposal untouched in that case (still `CLAIMED`, for some
    /// caller to resolve).
    pub async fn mark_processed(
        &self,
        id: ProposalId,
        candidates: Candidates,
    ) -> Result<ProposalState, SpindleError> {
        let proposal = self.get(id).await?;

        if candidates.len() != proposal.n_candidates {
            return Err(SpindleError::CountMismatch {
                expected: proposal.n_candidates,
                got: candidates.len(),
            });
        }

        self.store
            .update(
                id,
                ProposalUpdate {
                    state: Some(ProposalState::Finished),
                    candidates: Some(candidates),
                    error_message: None,
                    last_updated_at: Some(Utc::now()),
                },
            )
            .await?;

        info!(proposal_id = %id, "proposal processed");
        Ok(ProposalState::Finished)
    }

    /// Fail the proposal, storing the message verbatim.
    ///
    /// No prior-state guard: callable from any state, including re-failing
    /// an already-terminal proposal. Last write wins on state and message;
    /// candidates already stored by a finished proposal are retained and
    /// stay retrievable.
    pub async fn mark_failed(
        &self,
        id: ProposalId,
        message: impl Into<String>,
    ) -> Result<ProposalState, SpindleError> {
        // Existence check only; the transition itself is unconditional.
        self.get(id).await?;

        let message = message.into();
        self.store
            .update(
                id,
                ProposalUpdate {
                    state: Some(ProposalState::Failed),
                    candidates: None,
                    error_message: Some(message.clone()),
                    last_updated_at: Some(Utc::now()),
                },
            )
            .await?;

        info!(proposal_id = %id, error = %message, "proposal failed");
        Ok(ProposalState::Failed)
    }

    /// Counts by state for observability.
    pub async fn counts_by_state(&self) -> Result<ProposalCounts, SpindleError> {
        let mut counts = ProposalCounts::default();
        for proposal in self.store.all().await? {
            match proposal.state {
                ProposalState::Created => counts.created += 1,
                ProposalState::Claimed => counts.claimed += 1,
                ProposalState::Finished => counts.finished += 1,
                ProposalState::Failed => counts.failed += 1,
            }
        }
        Ok(counts)
    }
}
