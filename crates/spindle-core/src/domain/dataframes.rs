//! Row-oriented payloads exchanged at the boundary.
//!
//! Candidates flow out of the generator; experiments flow in as prior
//! observations. Both are kept as ordered key/value rows so the core stays
//! agnostic about the feature and output spaces.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One proposed candidate point.
///
/// `inputs` are the coordinates in the search domain; `predictions` are
/// optional model outputs attached by the strategy (empty for strategies
/// that do not predict).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRow {
    pub inputs: BTreeMap<String, serde_json::Value>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub predictions: BTreeMap<String, serde_json::Value>,
}

impl CandidateRow {
    pub fn new(inputs: BTreeMap<String, serde_json::Value>) -> Self {
        Self {
            inputs,
            predictions: BTreeMap::new(),
        }
    }
}

/// Result set produced by a candidate generator.
///
/// Row count is bound to the owning proposal's `n_candidates` whenever the
/// proposal completes; the service enforces the match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidates {
    pub rows: Vec<CandidateRow>,
}

impl Candidates {
    pub fn new(rows: Vec<CandidateRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One prior observation: inputs that were evaluated and the outputs seen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentRow {
    pub inputs: BTreeMap<String, serde_json::Value>,
    pub outputs: BTreeMap<String, serde_json::Value>,
}

/// Prior observation set handed to the generator. Absent means cold start.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experiments {
    pub rows: Vec<ExperimentRow>,
}

impl Experiments {
    pub fn new(rows: Vec<ExperimentRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
