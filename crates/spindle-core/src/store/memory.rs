//! In-memory store implementation.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::{ProposalStore, ProposalUpdate, StoreError};
use crate::domain::{Proposal, ProposalId, ProposalState};

/// In-memory store state.
struct InMemoryStoreState {
    /// All proposal records, keyed by raw id. BTreeMap keeps iteration in
    /// ascending id order, which is the claim tie-break.
    records: BTreeMap<u64, Proposal>,

    /// Next id to assign (first insert gets 1).
    next_id: u64,
}

impl InMemoryStoreState {
    fn new() -> Self {
        Self {
            records: BTreeMap::new(),
            next_id: 1,
        }
    }

    fn allocate_id(&mut self) -> ProposalId {
        let id = ProposalId::new(self.next_id);
        self.next_id += 1;
        id
    }
}

/// In-memory `ProposalStore`.
///
/// A single `Mutex` guards all records, so every operation is atomic from
/// the store's perspective. In particular `claim_next` selects and
/// transitions under one lock acquisition, which is what makes concurrent
/// claims exactly-once.
#[derive(Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<InMemoryStoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(InMemoryStoreState::new())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProposalStore for InMemoryStore {
    async fn insert(&self, mut proposal: Proposal) -> Result<ProposalId, StoreError> {
        let mut state = self.state.lock().await;
        let id = state.allocate_id();
        proposal.id = id;
        state.records.insert(id.as_u64(), proposal);
        Ok(id)
    }

    async fn get(&self, id: ProposalId) -> Result<Option<Proposal>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.records.get(&id.as_u64()).cloned())
    }

    async fn all(&self) -> Result<Vec<Proposal>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.records.values().cloned().collect())
    }

    async fn find_by_state(&self, wanted: ProposalState) -> Result<Vec<Proposal>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .records
            .values()
            .filter(|p| p.state == wanted)
            .cloned()
            .collect())
    }

    async fn update(&self, id: ProposalId, update: ProposalUpdate) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if let Some(record) = state.records.get_mut(&id.as_u64()) {
            if let Some(new_state) = update.state {
                record.state = new_state;
            }
            if let Some(candidates) = update.candidates {
                record.candidates = Some(candidates);
            }
            if let Some(message) = update.error_message {
                record.error_message = Some(message);
            }
            if let Some(ts) = update.last_updated_at {
                record.last_updated_at = ts;
            }
        }
        Ok(())
    }

    async fn claim_next(&self, now: DateTime<Utc>) -> Result<Option<Proposal>, StoreError> {
        let mut state = self.state.lock().await;

        // Select and transition under the same lock: this is the atomicity
        // guarantee the claim protocol rests on.
        let candidate = state
            .records
            .values_mut()
            .find(|p| p.state == ProposalState::Created);

        match candidate {
            Some(record) => {
                record.mark_claimed(now);
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }
}
