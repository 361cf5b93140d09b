//! Per-metric sequence runner.
//!
//! A runner walks its metric's sequences in declared order, wrapping to the
//! first after the last. Each sequence ticks every `interval` until its
//! `duration` has elapsed. The runner owns its own cancellation token; the
//! sleep between ticks races against it so a stop takes effect immediately.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

use pdg_core::error::PdgError;
use pdg_core::model::MetricSpec;

use super::adapter;
use crate::obs::Instrument;

/// Roughly thirty years, used when a sequence's `eval_time` does not fit
/// the clock.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Invoked when a runner hits an error that must end the process.
pub type FatalHook = Arc<dyn Fn(&PdgError) + Send + Sync>;

/// Default hook: log and exit with status 1.
pub fn exit_process() -> FatalHook {
    Arc::new(|err| {
        tracing::error!(code = err.code().as_str(), "{err}, terminating");
        std::process::exit(1);
    })
}

/// Stop flag and join handle of one spawned runner. Never reused across
/// generations.
pub struct RunnerHandle {
    metric: String,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl RunnerHandle {
    /// Signal the runner to stop. Does not wait.
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the runner task to exit.
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            tracing::warn!(metric = %self.metric, error = %e, "runner task ended abnormally");
        }
    }
}

pub struct SequenceRunner {
    spec: Arc<MetricSpec>,
    instrument: Arc<Instrument>,
    token: CancellationToken,
    on_fatal: FatalHook,
    rng: StdRng,
}

impl SequenceRunner {
    pub fn new(spec: Arc<MetricSpec>, instrument: Arc<Instrument>, on_fatal: FatalHook) -> Self {
        Self {
            spec,
            instrument,
            token: CancellationToken::new(),
            on_fatal,
            rng: StdRng::from_entropy(),
        }
    }

    /// Use a fixed seed instead of entropy.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn spawn(self) -> RunnerHandle {
        let metric = self.spec.name.clone();
        let token = self.token.clone();
        let task = tokio::spawn(self.run());
        RunnerHandle {
            metric,
            token,
            task,
        }
    }

    async fn run(mut self) {
        let spec = Arc::clone(&self.spec);
        let metric = spec.name.as_str();

        if spec.sequences.is_empty() {
            tracing::debug!(metric, "no sequences declared, idling until stopped");
            self.token.cancelled().await;
            return;
        }

        let mut index = 0;
        'schedule: while !self.token.is_cancelled() {
            let seq = &spec.sequences[index];
            let deadline = deadline_after(seq.duration);
            tracing::debug!(metric, sequence = index, "changing sequence");

            loop {
                if self.token.is_cancelled() {
                    break 'schedule;
                }
                if Instant::now() > deadline {
                    break;
                }

                let value = seq.source.generate(&mut self.rng);
                if let Err(err) = adapter::apply(&self.instrument, index, seq, value) {
                    tracing::error!(metric, sequence = index, error = %err, "cannot apply value");
                    (self.on_fatal)(&err);
                    break 'schedule;
                }

                tokio::select! {
                    _ = self.token.cancelled() => break 'schedule,
                    _ = sleep(seq.interval) => {}
                }
            }

            index = (index + 1) % spec.sequences.len();
            // Zero-length sequences would otherwise spin without yielding.
            tokio::task::yield_now().await;
        }

        tracing::debug!(metric, "runner stopped");
    }
}

fn deadline_after(duration: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(duration)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}
