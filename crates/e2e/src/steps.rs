//! Named scenario steps

use std::future::Future;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::{E2eError, E2eResult};

/// Result of executing a test step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub success: bool,
    pub step_name: String,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// Run `fut` as the step `name`.
///
/// A failure is logged and wrapped in [`E2eError::StepFailed`] so the runner
/// can tell which step aborted the scenario. Already-wrapped failures from
/// nested steps are passed through unchanged.
pub async fn step<T, F>(name: &str, fut: F) -> E2eResult<T>
where
    F: Future<Output = E2eResult<T>>,
{
    let start = Instant::now();
    info!("▶ {}", name);

    match fut.await {
        Ok(value) => {
            info!("✓ {} ({} ms)", name, start.elapsed().as_millis());
            Ok(value)
        }
        Err(e @ E2eError::StepFailed { .. }) => Err(e),
        Err(e) => {
            error!("✗ {} - {}", name, e);
            Err(E2eError::StepFailed {
                step: name.to_string(),
                source: Box::new(e),
            })
        }
    }
}

/// Run `fut` as the step `name` and record its outcome instead of
/// propagating it.
pub async fn record_step<F>(name: String, fut: F) -> StepResult
where
    F: Future<Output = E2eResult<()>>,
{
    let start = Instant::now();
    let result = fut.await;
    let duration_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(()) => StepResult {
            success: true,
            step_name: name,
            duration_ms,
            error: None,
        },
        Err(e) => StepResult {
            success: false,
            step_name: name,
            duration_ms,
            error: Some(e.to_string()),
        },
    }
}
