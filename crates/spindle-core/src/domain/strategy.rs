//! Strategy configuration carried by a proposal.

use serde::{Deserialize, Serialize};

/// Configuration for a candidate-generation strategy.
///
/// The core treats this as opaque: `strategy` names the algorithm and
/// `domain` is an arbitrary JSON definition of the search space. Generators
/// decode `domain` however they like; the service and store never look
/// inside it. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyData {
    pub strategy: String,
    pub domain: serde_json::Value,
}

impl StrategyData {
    pub fn new(strategy: impl Into<String>, domain: serde_json::Value) -> Self {
        Self {
            strategy: strategy.into(),
            domain,
        }
    }
}
