//! Candidate generator port.

use crate::domain::{Candidates, Experiments, StrategyData};
use crate::error::SpindleError;

/// A candidate-generation strategy.
///
/// Pure compute: strategy configuration plus optional prior experiments in,
/// a candidate set (or a failure) out. The worker runs this on a dedicated
/// thread behind a panic boundary, so implementations may be arbitrarily
/// expensive and may panic without taking the worker down. They must not
/// retry internally; retry policy belongs to the engine.
///
/// `strategy.domain` is opaque JSON: implementations decode it however
/// they like.
pub trait CandidateGenerator: Send + Sync + 'static {
    fn generate(
        &self,
        strategy: &StrategyData,
        experiments: Option<&Experiments>,
        n_candidates: usize,
    ) -> Result<Candidates, SpindleError>;
}
