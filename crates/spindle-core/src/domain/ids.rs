//! Proposal identifier.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a proposal.
///
/// Assigned by the store on insertion (first id is 1, ascending) and stable
/// for the lifetime of the record. The service only ever hands out persisted
/// records, so a `ProposalId` always refers to something that was inserted.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProposalId(u64);

impl ProposalId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
