use serde::{Deserialize, Serialize};

/// Proposal counts by state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProposalCounts {
    pub created: usize,
    pub claimed: usize,
    pub finished: usize,
    pub failed: usize,
}
