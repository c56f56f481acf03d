//! Transport client port and in-process implementation.
//!
//! The worker never talks to the service directly; it goes through this
//! port so the wire transport can be swapped without touching the engine.
//! Connectivity and validation faults come back as errors, distinguishable
//! from "no proposal available" (`Ok(None)`).

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Candidates, Proposal, ProposalId, ProposalState};
use crate::error::SpindleError;
use crate::service::ProposalService;

/// Client surface consumed by the worker execution engine.
#[async_trait]
pub trait TransportClient: Send + Sync {
    /// Service version, used as a connectivity probe.
    async fn version(&self) -> Result<String, SpindleError>;

    /// Claim one proposal. `Ok(None)` means no work available.
    async fn claim_proposal(&self) -> Result<Option<Proposal>, SpindleError>;

    /// Report a successful result set.
    async fn mark_processed(
        &self,
        id: ProposalId,
        candidates: Candidates,
    ) -> Result<ProposalState, SpindleError>;

    /// Report a failure.
    async fn mark_failed(
        &self,
        id: ProposalId,
        error_message: String,
    ) -> Result<ProposalState, SpindleError>;
}

/// In-process transport: calls the service directly.
///
/// This is the reference implementation of the transport contract; an HTTP
/// client implementing the same trait slots in without changing the worker.
#[derive(Clone)]
pub struct InProcessClient {
    service: Arc<ProposalService>,
}

impl InProcessClient {
    /// Wrap a service, probing it once so an unreachable backend fails at
    /// construction rather than mid-round.
    pub async fn connect(service: Arc<ProposalService>) -> Result<Self, SpindleError> {
        let client = Self { service };
        client.version().await?;
        Ok(client)
    }
}

#[async_trait]
impl TransportClient for InProcessClient {
    async fn version(&self) -> Result<String, SpindleError> {
        Ok(env!("CARGO_PKG_VERSION").to_string())
    }

    async fn claim_proposal(&self) -> Result<Option<Proposal>, SpindleError> {
        self.service.claim().await
    }

    async fn mark_processed(
        &self,
        id: ProposalId,
        candidates: Candidates,
    ) -> Result<ProposalState, SpindleError> {
        self.service.mark_processed(id, candidates).await
    }

    async fn mark_failed(
        &self,
        id: ProposalId,
        error_message: String,
    ) -> Result<ProposalState, SpindleError> {
        self.service.mark_failed(id, error_message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ProposalRequest, StrategyData};
    use crate::store::InMemoryStore;

    fn service() -> Arc<ProposalService> {
        Arc::new(ProposalService::new(Arc::new(InMemoryStore::new())))
    }

    #[tokio::test]
    async fn connect_probes_the_service() {
        let client = InProcessClient::connect(service()).await.unwrap();
        assert!(!client.version().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn claim_round_trips_through_the_service() {
        let svc = service();
        let client = InProcessClient::connect(Arc::clone(&svc)).await.unwrap();

        assert!(client.claim_proposal().await.unwrap().is_none());

        let request = ProposalRequest::new(
            StrategyData::new("random", serde_json::json!({"inputs": []})),
            1,
        );
        let created = svc.create(request).await.unwrap();

        let claimed = client.claim_proposal().await.unwrap().unwrap();
        assert_eq!(claimed.id, created.id);
        assert_eq!(claimed.state, ProposalState::Claimed);
    }
}
