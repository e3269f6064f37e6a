use crate::event::parse_event;
use rand::Rng;
use snaplink_core::{ClickQueue, MappingStore, QueueError, StorageError};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};
use typed_builder::TypedBuilder;

pub const DEFAULT_IDLE_BACKOFF: Duration = Duration::from_millis(500);
pub const DEFAULT_IDLE_JITTER: Duration = Duration::from_millis(50);
pub const DEFAULT_ERROR_BACKOFF: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct AggregatorSettings {
    /// Pause after finding the queue empty.
    #[builder(default = DEFAULT_IDLE_BACKOFF)]
    pub idle_backoff: Duration,
    /// Upper bound of the random delay added to each idle pause, so that
    /// several aggregators on one queue do not poll in lockstep.
    #[builder(default = DEFAULT_IDLE_JITTER)]
    pub idle_jitter: Duration,
    /// Pause after a queue or store failure.
    #[builder(default = DEFAULT_ERROR_BACKOFF)]
    pub error_backoff: Duration,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// What a single [`Aggregator::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The queue was empty.
    Idle,
    /// One click was added to the store.
    Applied,
    /// The event can never be applied and was discarded.
    Dropped,
    /// The queue or the store failed. The event, if any, is lost.
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub applied: u64,
    pub dropped: u64,
    pub failed: u64,
}

impl DrainReport {
    fn record(&mut self, outcome: StepOutcome) {
        match outcome {
            StepOutcome::Idle => {}
            StepOutcome::Applied => self.applied += 1,
            StepOutcome::Dropped => self.dropped += 1,
            StepOutcome::Failed => self.failed += 1,
        }
    }

    /// Number of events taken off the queue.
    pub fn total(&self) -> u64 {
        self.applied + self.dropped + self.failed
    }
}

/// Consumes click events and applies them to the mapping store.
#[derive(Debug)]
pub struct Aggregator<Q, S> {
    queue: Q,
    store: S,
    settings: AggregatorSettings,
}

impl<Q: ClickQueue, S: MappingStore> Aggregator<Q, S> {
    pub fn new(queue: Q, store: S) -> Self {
        Self::with_settings(queue, store, AggregatorSettings::default())
    }

    pub fn with_settings(queue: Q, store: S, settings: AggregatorSettings) -> Self {
        Self {
            queue,
            store,
            settings,
        }
    }

    pub fn settings(&self) -> &AggregatorSettings {
        &self.settings
    }

    /// Takes at most one event off the queue and applies it.
    pub async fn step(&self) -> StepOutcome {
        match self.try_step().await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "failed to pop from click queue");
                StepOutcome::Failed
            }
        }
    }

    async fn try_step(&self) -> Result<StepOutcome, QueueError> {
        let Some(payload) = self.queue.pop().await? else {
            return Ok(StepOutcome::Idle);
        };
        Ok(self.apply(&payload).await)
    }

    async fn apply(&self, payload: &str) -> StepOutcome {
        let event = match parse_event(payload) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, payload, "dropping malformed click event");
                return StepOutcome::Dropped;
            }
        };

        match self.store.increment_count(&event.code).await {
            Ok(()) => {
                trace!(code = %event.code, "applied click");
                StepOutcome::Applied
            }
            Err(StorageError::NotFound(_)) => {
                warn!(code = %event.code, "dropping click for unknown short code");
                StepOutcome::Dropped
            }
            Err(e) => {
                error!(code = %event.code, error = %e, "failed to apply click, event lost");
                StepOutcome::Failed
            }
        }
    }

    /// Processes events until the queue reports empty.
    ///
    /// Stops early if the queue itself fails; that failure is counted once
    /// in [`DrainReport::failed`].
    pub async fn drain(&self) -> DrainReport {
        let mut report = DrainReport::default();
        loop {
            match self.try_step().await {
                Ok(StepOutcome::Idle) => break,
                Ok(outcome) => report.record(outcome),
                Err(e) => {
                    warn!(error = %e, "click queue failed, stopping drain");
                    report.failed += 1;
                    break;
                }
            }
        }
        debug!(?report, "drained click queue");
        report
    }

    /// Runs the aggregation loop until `shutdown` completes.
    ///
    /// `shutdown` is observed between steps and while backing off, never in
    /// the middle of applying an event.
    pub async fn run<F>(&self, shutdown: F) -> DrainReport
    where
        F: Future<Output = ()> + Send,
    {
        tokio::pin!(shutdown);
        let mut report = DrainReport::default();
        info!(settings = ?self.settings, "click aggregator started");

        loop {
            let outcome = self.step().await;
            report.record(outcome);

            let pause = match outcome {
                StepOutcome::Idle => self.idle_pause(),
                StepOutcome::Failed => self.settings.error_backoff,
                StepOutcome::Applied | StepOutcome::Dropped => Duration::ZERO,
            };

            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(pause) => {}
            }
        }

        info!(
            applied = report.applied,
            dropped = report.dropped,
            failed = report.failed,
            "click aggregator stopped"
        );
        report
    }

    fn idle_pause(&self) -> Duration {
        let jitter = self.settings.idle_jitter;
        if jitter.is_zero() {
            return self.settings.idle_backoff;
        }
        let extra = rand::thread_rng().gen_range(Duration::ZERO..=jitter);
        self.settings.idle_backoff + extra
    }
}
