//! Proposal store port and in-memory implementation.

mod memory;

pub use memory::InMemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{Candidates, Proposal, ProposalId, ProposalState};

/// Store-level failure. The core treats the store as either working or
/// unavailable; finer-grained diagnostics stay in the message.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("proposal store unavailable: {0}")]
    Unavailable(String),
}

/// Partial field update applied by id. Fields left `None` are untouched.
#[derive(Debug, Clone, Default)]
pub struct ProposalUpdate {
    pub state: Option<ProposalState>,
    pub candidates: Option<Candidates>,
    pub error_message: Option<String>,
    pub last_updated_at: Option<DateTime<Utc>>,
}

/// Durable mapping from proposal id to proposal record.
///
/// Port (interface): the in-memory implementation is the default, but this
/// trait is the seam for swapping in a persistent document store later.
///
/// Contract: `claim_next` must be atomic with respect to other concurrent
/// `claim_next` calls. Two callers must never both receive the same id in
/// `CLAIMED` state. A select followed by a separate update does not satisfy
/// this; implementations have to guard the transition (single lock,
/// conditional write, or a serialized claim arbiter).
#[async_trait]
pub trait ProposalStore: Send + Sync {
    /// Insert a record, assigning its id. Returns the assigned id.
    async fn insert(&self, proposal: Proposal) -> Result<ProposalId, StoreError>;

    /// Point lookup. `Ok(None)` when no record with that id exists.
    async fn get(&self, id: ProposalId) -> Result<Option<Proposal>, StoreError>;

    /// Full scan. Order not significant to callers.
    async fn all(&self) -> Result<Vec<Proposal>, StoreError>;

    /// All records currently in `state`.
    async fn find_by_state(&self, state: ProposalState) -> Result<Vec<Proposal>, StoreError>;

    /// Apply a partial field update to an existing record.
    ///
    /// Updating a missing id is a no-op; existence checks belong to the
    /// service layer.
    async fn update(&self, id: ProposalId, update: ProposalUpdate) -> Result<(), StoreError>;

    /// Atomically transition the first `CREATED` proposal (lowest id) to
    /// `CLAIMED`, refreshing `last_updated_at`, and return the updated
    /// record. `Ok(None)` when no `CREATED` record exists.
    async fn claim_next(&self, now: DateTime<Utc>) -> Result<Option<Proposal>, StoreError>;
}
