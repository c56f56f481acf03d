//! Worker execution engine.
//!
//! Drives one claimed proposal at a time to a terminal outcome. The
//! candidate generator runs on a dedicated thread behind a panic boundary
//! and reports through a one-shot channel, so a fault inside generation
//! can never take down the control loop.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, error, info};

use crate::domain::{Candidates, Proposal, ProposalId};
use crate::generator::CandidateGenerator;
use crate::transport::TransportClient;

pub struct Worker {
    client: Arc<dyn TransportClient>,
    generator: Arc<dyn CandidateGenerator>,

    /// Governs both the idle-retry delay and the in-flight poll granularity.
    job_check_interval: Duration,

    /// Process-local round counter, for log correlation only.
    round: u64,
}

impl Worker {
    pub fn new(
        client: Arc<dyn TransportClient>,
        generator: Arc<dyn CandidateGenerator>,
        job_check_interval: Duration,
    ) -> Self {
        Self {
            client,
            generator,
            job_check_interval,
            round: 0,
        }
    }

    /// Outer loop: repeat rounds forever.
    ///
    /// No shutdown signal is defined at this layer; process termination is
    /// the only exit.
    pub async fn work(&mut self) {
        loop {
            self.work_round().await;
        }
    }

    /// One round: claim, execute in isolation, resolve to a terminal mark.
    ///
    /// At most one proposal is in flight per worker. Every fault between a
    /// successful claim and a successful terminal mark collapses into a
    /// single `mark_failed` attempt.
    pub async fn work_round(&mut self) {
        debug!(round = self.round, "starting round");
        self.round += 1;

        let proposal = match self.client.claim_proposal().await {
            Ok(Some(proposal)) => proposal,
            Ok(None) => {
                self.sleep("no proposal to work on").await;
                return;
            }
            Err(err) => {
                // A fault during claim itself aborts the round; there is
                // nothing claimed yet to fail.
                error!(error = %err, "claiming a proposal failed");
                self.sleep("claim failed").await;
                return;
            }
        };

        info!(proposal_id = %proposal.id, "claimed proposal");
        let id = proposal.id;

        let outcome = self.run_generation(proposal).await;
        self.resolve(id, outcome).await;
    }

    /// Run the generator in an isolated execution unit and wait for its
    /// single result message.
    ///
    /// The unit is a named OS thread: it receives the proposal's strategy
    /// data, experiments, and requested count, sends exactly one message on
    /// the channel (candidates, or failure text with panics converted to
    /// text), and terminates. No shared mutable state with the controller,
    /// no internal retry.
    ///
    /// The wait is a bounded receive re-armed on timeout, only to emit a
    /// liveness log. Total wait is unbounded: generator termination is a
    /// liveness assumption, not something enforced here.
    async fn run_generation(&self, proposal: Proposal) -> Result<Candidates, String> {
        let id = proposal.id;
        let (tx, mut rx) = oneshot::channel::<Result<Candidates, String>>();
        let generator = Arc::clone(&self.generator);

        let spawned = thread::Builder::new()
            .name(format!("candidate-generator-{id}"))
            .spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    generator.generate(
                        &proposal.strategy_data,
                        proposal.experiments.as_ref(),
                        proposal.n_candidates,
                    )
                }));
                let message = match result {
                    Ok(Ok(candidates)) => Ok(candidates),
                    Ok(Err(err)) => Err(err.to_string()),
                    Err(panic) => Err(panic_text(panic)),
                };
                // Receiver gone means the controller is gone; nothing to do.
                let _ = tx.send(message);
            });

        if let Err(err) = spawned {
            return Err(format!("could not spawn generator thread: {err}"));
        }

        loop {
            match tokio::time::timeout(self.job_check_interval, &mut rx).await {
                Ok(Ok(message)) => return message,
                Ok(Err(_closed)) => {
                    return Err("generator exited without reporting a result".to_string());
                }
                Err(_elapsed) => {
                    debug!(proposal_id = %id, "generator still running");
                }
            }
        }
    }

    /// Resolve a generation outcome to exactly one terminal mark.
    async fn resolve(&self, id: ProposalId, outcome: Result<Candidates, String>) {
        let failure = match outcome {
            Ok(candidates) => match self.client.mark_processed(id, candidates).await {
                Ok(_) => {
                    info!(proposal_id = %id, "proposal processed successfully");
                    return;
                }
                // A rejected or unreachable mark joins the failure path.
                Err(err) => err.to_string(),
            },
            Err(message) => message,
        };

        error!(proposal_id = %id, error = %failure, "error processing proposal");
        if let Err(err) = self.client.mark_failed(id, failure).await {
            // Unrecoverable at this layer: the proposal stays CLAIMED.
            error!(
                proposal_id = %id,
                error = %err,
                "mark_failed did not reach the service; proposal remains claimed"
            );
        }
    }

    async fn sleep(&self, reason: &str) {
        debug!(
            seconds = self.job_check_interval.as_secs_f64(),
            reason, "sleeping"
        );
        tokio::time::sleep(self.job_check_interval).await;
    }
}

fn panic_text(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "generator panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::{
        CandidateRow, Experiments, ProposalRequest, ProposalState, StrategyData,
    };
    use crate::error::SpindleError;
    use crate::service::ProposalService;
    use crate::store::InMemoryStore;
    use crate::transport::InProcessClient;

    const TICK: Duration = Duration::from_millis(5);

    fn request(n_candidates: usize) -> ProposalRequest {
        ProposalRequest::new(
            StrategyData::new("random", serde_json::json!({"inputs": []})),
            n_candidates,
        )
    }

    fn rows(n: usize) -> Candidates {
        let rows = (0..n)
            .map(|i| {
                let mut inputs = BTreeMap::new();
                inputs.insert("x".to_string(), serde_json::json!(i as f64));
                CandidateRow::new(inputs)
            })
            .collect();
        Candidates::new(rows)
    }

    /// Generator returning a fixed number of rows, regardless of the ask.
    struct FixedGenerator {
        n: usize,
        delay: Option<Duration>,
    }

    impl CandidateGenerator for FixedGenerator {
        fn generate(
            &self,
            _strategy: &StrategyData,
            _experiments: Option<&Experiments>,
            _n_candidates: usize,
        ) -> Result<Candidates, SpindleError> {
            if let Some(delay) = self.delay {
                thread::sleep(delay);
            }
            Ok(rows(self.n))
        }
    }

    struct FailingGenerator;

    impl CandidateGenerator for FailingGenerator {
        fn generate(
            &self,
            _strategy: &StrategyData,
            _experiments: Option<&Experiments>,
            _n_candidates: usize,
        ) -> Result<Candidates, SpindleError> {
            Err(SpindleError::Generation("singular matrix".to_string()))
        }
    }

    struct PanickingGenerator;

    impl CandidateGenerator for PanickingGenerator {
        fn generate(
            &self,
            _strategy: &StrategyData,
            _experiments: Option<&Experiments>,
            _n_candidates: usize,
        ) -> Result<Candidates, SpindleError> {
            panic!("optimizer aborted");
        }
    }

    /// Transport stub whose claim always fails, to exercise the abort path.
    struct DownClient;

    #[async_trait]
    impl TransportClient for DownClient {
        async fn version(&self) -> Result<String, SpindleError> {
            Err(SpindleError::Transport("backend unreachable".to_string()))
        }

        async fn claim_proposal(&self) -> Result<Option<Proposal>, SpindleError> {
            Err(SpindleError::Transport("backend unreachable".to_string()))
        }

        async fn mark_processed(
            &self,
            _id: ProposalId,
            _candidates: Candidates,
        ) -> Result<ProposalState, SpindleError> {
            panic!("mark_processed must not be reached without a claim");
        }

        async fn mark_failed(
            &self,
            _id: ProposalId,
            _error_message: String,
        ) -> Result<ProposalState, SpindleError> {
            panic!("mark_failed must not be reached without a claim");
        }
    }

    async fn harness(
        generator: impl CandidateGenerator,
    ) -> (Arc<ProposalService>, Worker) {
        let service = Arc::new(ProposalService::new(Arc::new(InMemoryStore::new())));
        let client = InProcessClient::connect(Arc::clone(&service)).await.unwrap();
        let worker = Worker::new(Arc::new(client), Arc::new(generator), TICK);
        (service, worker)
    }

    #[tokio::test]
    async fn successful_round_finishes_the_proposal() {
        let (service, mut worker) = harness(FixedGenerator { n: 3, delay: None }).await;
        let proposal = service.create(request(3)).await.unwrap();

        worker.work_round().await;

        assert_eq!(
            service.get_state(proposal.id).await.unwrap(),
            ProposalState::Finished
        );
        assert_eq!(service.get_candidates(proposal.id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn generator_failure_fails_the_proposal() {
        let (service, mut worker) = harness(FailingGenerator).await;
        let proposal = service.create(request(1)).await.unwrap();

        worker.work_round().await;

        let stored = service.get(proposal.id).await.unwrap();
        assert_eq!(stored.state, ProposalState::Failed);
        assert!(
            stored
                .error_message
                .as_deref()
                .unwrap()
                .contains("singular matrix")
        );

        let err = service.get_candidates(proposal.id).await.unwrap_err();
        assert!(matches!(err, SpindleError::CandidatesNotFound(_)));
    }

    #[tokio::test]
    async fn count_mismatch_joins_the_failure_path() {
        // Generator returns 4 rows for a proposal asking 5: mark_processed
        // rejects, and the engine turns that rejection into a mark_failed.
        let (service, mut worker) = harness(FixedGenerator { n: 4, delay: None }).await;
        let proposal = service.create(request(5)).await.unwrap();

        worker.work_round().await;

        let stored = service.get(proposal.id).await.unwrap();
        assert_eq!(stored.state, ProposalState::Failed);
        assert_eq!(
            stored.error_message.as_deref(),
            Some("expected 5 candidates, got 4")
        );
    }

    #[tokio::test]
    async fn panic_is_contained_and_the_loop_keeps_going() {
        let (service, mut worker) = harness(PanickingGenerator).await;
        let first = service.create(request(1)).await.unwrap();
        let second = service.create(request(1)).await.unwrap();

        worker.work_round().await;
        worker.work_round().await;

        let stored = service.get(first.id).await.unwrap();
        assert_eq!(stored.state, ProposalState::Failed);
        assert!(
            stored
                .error_message
                .as_deref()
                .unwrap()
                .contains("optimizer aborted")
        );

        // The loop survived the panic: the second proposal was claimed and
        // resolved too.
        assert_eq!(
            service.get_state(second.id).await.unwrap(),
            ProposalState::Failed
        );
    }

    #[tokio::test]
    async fn slow_generator_survives_poll_rearming() {
        // Generation takes several poll intervals; the bounded wait re-arms
        // until the result arrives.
        let generator = FixedGenerator {
            n: 1,
            delay: Some(TICK * 6),
        };
        let (service, mut worker) = harness(generator).await;
        let proposal = service.create(request(1)).await.unwrap();

        worker.work_round().await;

        assert_eq!(
            service.get_state(proposal.id).await.unwrap(),
            ProposalState::Finished
        );
    }

    #[tokio::test]
    async fn idle_round_sleeps_and_returns() {
        let (_service, mut worker) = harness(FixedGenerator { n: 1, delay: None }).await;
        worker.work_round().await;
        assert_eq!(worker.round, 1);
    }

    #[tokio::test]
    async fn claim_failure_aborts_the_round() {
        // The stub panics if any mark call is attempted, so completing this
        // round proves nothing was marked.
        let mut worker = Worker::new(
            Arc::new(DownClient),
            Arc::new(FixedGenerator { n: 1, delay: None }),
            TICK,
        );
        worker.work_round().await;
        assert_eq!(worker.round, 1);
    }

    #[tokio::test]
    async fn experiments_are_passed_through_to_the_generator() {
        struct AssertingGenerator;

        impl CandidateGenerator for AssertingGenerator {
            fn generate(
                &self,
                strategy: &StrategyData,
                experiments: Option<&Experiments>,
                n_candidates: usize,
            ) -> Result<Candidates, SpindleError> {
                assert_eq!(strategy.strategy, "random");
                assert_eq!(experiments.map(Experiments::len), Some(1));
                Ok(rows(n_candidates))
            }
        }

        let (service, mut worker) = harness(AssertingGenerator).await;

        let mut inputs = BTreeMap::new();
        inputs.insert("x".to_string(), serde_json::json!(0.5));
        let mut outputs = BTreeMap::new();
        outputs.insert("y".to_string(), serde_json::json!(1.5));
        let experiments = Experiments::new(vec![crate::domain::ExperimentRow {
            inputs,
            outputs,
        }]);

        let proposal = service
            .create(request(2).with_experiments(experiments))
            .await
            .unwrap();

        worker.work_round().await;

        assert_eq!(
            service.get_state(proposal.id).await.unwrap(),
            ProposalState::Finished
        );
    }
}
