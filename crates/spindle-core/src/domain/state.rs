//! Proposal lifecycle states.

use std::fmt;

use serde::{Deserialize, Serialize};

/// State of a proposal.
///
/// Transitions:
/// - `Created`: inserted, waiting to be claimed
/// - `Claimed`: owned by exactly one worker
/// - `Finished`: candidates stored (terminal)
/// - `Failed`: error message stored (terminal)
///
/// Serialized as SCREAMING_SNAKE_CASE to match the wire enumeration
/// CREATED / CLAIMED / FINISHED / FAILED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalState {
    Created,
    Claimed,
    Finished,
    Failed,
}

impl ProposalState {
    /// Terminal states accept no further transitions from the worker side.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Failed)
    }
}

impl fmt::Display for ProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Created => "CREATED",
            Self::Claimed => "CLAIMED",
            Self::Finished => "FINISHED",
            Self::Failed => "FAILED",
        };
        f.write_str(s)
    }
}
