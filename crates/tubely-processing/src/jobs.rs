//! Bounds on external media work: a shared concurrency limit and
//! per-request deadlines.

use crate::error::ProcessingError;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::{timeout_at, Instant};

/// Caps how many probe/remux processes run at once across all requests.
#[derive(Clone)]
pub struct MediaJobLimiter {
    semaphore: Arc<Semaphore>,
}

impl MediaJobLimiter {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Run `work` while holding a permit. Waiting for the permit and the work
    /// itself both count against `deadline`; on expiry the work future is
    /// dropped, which kills any child process it spawned.
    pub async fn run<T, E, F>(&self, stage: &'static str, deadline: Instant, work: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<ProcessingError>,
    {
        let _permit = timeout_at(deadline, self.semaphore.acquire())
            .await
            .map_err(|_| {
                tracing::warn!(stage, "Deadline expired waiting for a media job slot");
                ProcessingError::Timeout { stage }
            })?
            .map_err(|_| ProcessingError::LimiterClosed)?;

        with_deadline(stage, deadline, work).await
    }
}

/// Fail with `Timeout { stage }` if `work` is not done by `deadline`.
pub async fn with_deadline<T, E, F>(stage: &'static str, deadline: Instant, work: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: From<ProcessingError>,
{
    match timeout_at(deadline, work).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(stage, "Deadline expired");
            Err(ProcessingError::Timeout { stage }.into())
        }
    }
}
