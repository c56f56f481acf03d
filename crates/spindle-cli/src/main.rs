//! End-to-end demo: in-memory store, in-process transport, one worker, and
//! a random-sampling generator standing in for a real strategy library.

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::Rng;
use serde::Deserialize;
use tracing::info;

use spindle_core::config::WorkerConfig;
use spindle_core::domain::{
    CandidateRow, Candidates, Experiments, ProposalRequest, StrategyData,
};
use spindle_core::error::SpindleError;
use spindle_core::generator::CandidateGenerator;
use spindle_core::service::ProposalService;
use spindle_core::store::InMemoryStore;
use spindle_core::transport::InProcessClient;
use spindle_core::worker::Worker;

#[derive(Debug, Deserialize)]
struct InputFeature {
    key: String,
    lower: f64,
    upper: f64,
}

#[derive(Debug, Deserialize)]
struct SamplingDomain {
    inputs: Vec<InputFeature>,
}

/// Uniform random sampling over a box domain.
///
/// Decodes the opaque `domain` JSON as `{"inputs": [{key, lower, upper}]}`
/// and draws each candidate coordinate uniformly. Prior experiments are
/// ignored; random sampling has nothing to learn from them.
struct RandomSampler;

impl CandidateGenerator for RandomSampler {
    fn generate(
        &self,
        strategy: &StrategyData,
        _experiments: Option<&Experiments>,
        n_candidates: usize,
    ) -> Result<Candidates, SpindleError> {
        if strategy.strategy != "random" {
            return Err(SpindleError::Generation(format!(
                "unknown strategy: {}",
                strategy.strategy
            )));
        }

        let domain: SamplingDomain = serde_json::from_value(strategy.domain.clone())
            .map_err(|e| SpindleError::Generation(format!("invalid domain: {e}")))?;

        let mut rng = rand::thread_rng();
        let rows = (0..n_candidates)
            .map(|_| {
                let mut inputs = BTreeMap::new();
                for feature in &domain.inputs {
                    let value = rng.gen_range(feature.lower..=feature.upper);
                    inputs.insert(feature.key.clone(), serde_json::json!(value));
                }
                CandidateRow::new(inputs)
            })
            .collect();

        Ok(Candidates::new(rows))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("spindle_core=debug".parse()?)
                .add_directive("spindle_cli=info".parse()?),
        )
        .init();

    let config = WorkerConfig::from_env()?;
    info!(
        job_check_interval_secs = config.job_check_interval.as_secs_f64(),
        "configuration loaded"
    );

    // (A) store, service, and an in-process transport
    let service = Arc::new(ProposalService::new(Arc::new(InMemoryStore::new())));
    let client = InProcessClient::connect(Arc::clone(&service)).await?;

    // (B) one worker with the demo generator
    let mut worker = Worker::new(
        Arc::new(client),
        Arc::new(RandomSampler),
        config.job_check_interval,
    );
    let worker_handle = tokio::spawn(async move { worker.work().await });

    // (C) seed a proposal over a two-dimensional box domain
    let request = ProposalRequest::new(
        StrategyData::new(
            "random",
            serde_json::json!({
                "inputs": [
                    {"key": "x1", "lower": 0.0, "upper": 1.0},
                    {"key": "x2", "lower": -5.0, "upper": 5.0},
                ]
            }),
        ),
        3,
    );
    let proposal = service.create(request).await?;
    info!(proposal_id = %proposal.id, "proposal submitted");

    // (D) wait for a terminal state
    loop {
        let state = service.get_state(proposal.id).await?;
        if state.is_terminal() {
            info!(proposal_id = %proposal.id, state = %state, "proposal resolved");
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    match service.get_candidates(proposal.id).await {
        Ok(candidates) => {
            for (i, row) in candidates.rows.iter().enumerate() {
                info!(candidate = i, inputs = %serde_json::to_string(&row.inputs)?, "candidate");
            }
        }
        Err(err) => {
            let stored = service.get(proposal.id).await?;
            info!(error = %err, message = ?stored.error_message, "no candidates");
        }
    }

    let counts = service.counts_by_state().await?;
    info!(
        created = counts.created,
        claimed = counts.claimed,
        finished = counts.finished,
        failed = counts.failed,
        "final counts"
    );

    // Demo only: the worker loop has no shutdown signal, so stop it here.
    worker_handle.abort();
    Ok(())
}
