//! Proposal record: the unit of work and its record of outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Candidates, Experiments, ProposalId, ProposalState, StrategyData};

fn default_n_candidates() -> usize {
    1
}

/// Request to create a proposal.
///
/// `pendings` exists on the boundary for symmetry with direct candidate
/// generation, but proposals must not carry it; the service rejects a
/// request where it is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalRequest {
    pub strategy_data: StrategyData,

    /// Number of candidates the caller expects back. Must be positive.
    #[serde(default = "default_n_candidates")]
    pub n_candidates: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experiments: Option<Experiments>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pendings: Option<Candidates>,
}

impl ProposalRequest {
    pub fn new(strategy_data: StrategyData, n_candidates: usize) -> Self {
        Self {
            strategy_data,
            n_candidates,
            experiments: None,
            pendings: None,
        }
    }

    pub fn with_experiments(mut self, experiments: Experiments) -> Self {
        self.experiments = Some(experiments);
        self
    }
}

/// A persisted proposal.
///
/// Through the normal lifecycle `candidates` appears with `Finished`,
/// `error_message` with `Failed`, and neither in `Created`/`Claimed`;
/// whenever candidates are present their row count equals `n_candidates`.
/// Re-failing an already-finished proposal overwrites state and message but
/// retains the stored candidates (last write wins on the transition, fields
/// not named by it are untouched). The claim transition goes through
/// `mark_claimed`; terminal transitions are partial field updates applied by
/// the service. Every transition refreshes `last_updated_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub strategy_data: StrategyData,
    pub n_candidates: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experiments: Option<Experiments>,

    pub state: ProposalState,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Candidates>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

impl Proposal {
    /// Build a fresh `Created` record from a request.
    ///
    /// The id is whatever the store will assign; callers outside the store
    /// pass a placeholder and use the record returned by `insert`.
    pub fn from_request(id: ProposalId, request: ProposalRequest, now: DateTime<Utc>) -> Self {
        Self {
            id,
            strategy_data: request.strategy_data,
            n_candidates: request.n_candidates,
            experiments: request.experiments,
            state: ProposalState::Created,
            candidates: None,
            error_message: None,
            created_at: now,
            last_updated_at: now,
        }
    }

    /// Transition `Created` -> `Claimed`.
    pub fn mark_claimed(&mut self, now: DateTime<Utc>) {
        self.state = ProposalState::Claimed;
        self.last_updated_at = now;
    }
}
