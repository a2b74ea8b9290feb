//! Eventual-condition polling against a slowly converging backend
//!
//! A predicate is evaluated repeatedly until it reports [`PollOutcome::Success`],
//! reports [`PollOutcome::Fatal`], or the total timeout elapses. Waiting between
//! attempts is a `tokio` sleep, so concurrently running scenarios keep making
//! progress while one of them is waiting.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult};

/// Result of one predicate evaluation
#[derive(Debug)]
pub enum PollOutcome {
    /// The condition holds; stop polling.
    Success,
    /// The condition does not hold yet; retry after the next interval.
    NotYetReady(String),
    /// Something unexpected happened; stop immediately and surface the error.
    Fatal(E2eError),
}

impl PollOutcome {
    pub fn not_ready(reason: impl Into<String>) -> Self {
        PollOutcome::NotYetReady(reason.into())
    }

    /// Map the result of a check: assertion failures mean "not yet",
    /// any other error is fatal.
    pub fn from_check(result: E2eResult<()>) -> Self {
        match result {
            Ok(()) => PollOutcome::Success,
            Err(e) if e.is_assertion() => PollOutcome::NotYetReady(e.to_string()),
            Err(e) => PollOutcome::Fatal(e),
        }
    }
}

impl From<E2eError> for PollOutcome {
    fn from(err: E2eError) -> Self {
        PollOutcome::Fatal(err)
    }
}

/// Wait schedule and deadline for [`poll`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollOptions {
    /// Waits between attempts; the last one repeats once exhausted.
    pub intervals: Vec<Duration>,
    /// Total budget. Zero means a single evaluation.
    pub timeout: Duration,
    /// Prefix of the timeout message
    pub message: String,
}

impl PollOptions {
    pub fn new(
        intervals: Vec<Duration>,
        timeout: Duration,
        message: impl Into<String>,
    ) -> E2eResult<Self> {
        let options = Self {
            intervals,
            timeout,
            message: message.into(),
        };
        options.validate()?;
        Ok(options)
    }

    /// Fixed-rate polling, e.g. once per second.
    pub fn fixed(interval: Duration, timeout: Duration, message: impl Into<String>) -> Self {
        Self {
            intervals: vec![interval],
            timeout,
            message: message.into(),
        }
    }

    pub fn validate(&self) -> E2eResult<()> {
        if self.intervals.is_empty() {
            return Err(E2eError::InvalidPollConfig(format!(
                "'{}' has an empty interval schedule",
                self.message
            )));
        }
        Ok(())
    }

    /// Wait after the attempt with zero-based index `attempt`.
    fn interval_after(&self, attempt: usize) -> Duration {
        let last = self.intervals.len() - 1;
        self.intervals[attempt.min(last)]
    }
}

/// Summary of a successful poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollReport {
    pub attempts: u32,
    pub elapsed: Duration,
}

/// Evaluate `predicate` until it succeeds, fails fatally, or `options.timeout`
/// elapses.
///
/// Attempts never overlap: the next evaluation starts only after the previous
/// one finished and its interval passed.
pub async fn poll<F, Fut>(options: &PollOptions, mut predicate: F) -> E2eResult<PollReport>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PollOutcome>,
{
    options.validate()?;

    let start = Instant::now();
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;

        let reason = match predicate().await {
            PollOutcome::Success => {
                let elapsed = start.elapsed();
                info!(
                    "{}: ready after {} attempt(s) in {:?}",
                    options.message, attempts, elapsed
                );
                return Ok(PollReport { attempts, elapsed });
            }
            PollOutcome::Fatal(e) => {
                warn!("{}: attempt {} failed fatally: {}", options.message, attempts, e);
                return Err(e);
            }
            PollOutcome::NotYetReady(reason) => reason,
        };

        let elapsed = start.elapsed();
        if elapsed >= options.timeout {
            warn!(
                "{}: giving up after {} attempt(s) in {:?}: {}",
                options.message, attempts, elapsed, reason
            );
            return Err(E2eError::PollTimeout {
                message: options.message.clone(),
                attempts,
                elapsed,
                reason,
            });
        }

        let wait = options
            .interval_after(attempts as usize - 1)
            .min(options.timeout - elapsed);
        debug!(
            "{}: attempt {} not ready ({}), retrying in {:?}",
            options.message, attempts, reason, wait
        );
        sleep(wait).await;
    }
}
