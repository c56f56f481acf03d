//! Domain model (ids, states, strategy config, payloads, proposal record).

mod dataframes;
mod ids;
mod proposal;
mod state;
mod strategy;

pub use dataframes::{CandidateRow, Candidates, ExperimentRow, Experiments};
pub use ids::ProposalId;
pub use proposal::{Proposal, ProposalRequest};
pub use state::ProposalState;
pub use strategy::StrategyData;
