//! Retry policy for transient LLM/tool errors inside a single node step.
//!
//! The engine's error taxonomy already distinguishes transient errors
//! (`LLMUnavailable`, `ToolTransient`) from contract violations; this module
//! only decides how many times, and with what backoff, a node retries its own
//! transient failure before letting it propagate per that taxonomy.

use rand::Rng;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub initial_interval: Duration,
    pub backoff_factor: f64,
    pub max_interval: Duration,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_interval: Duration::from_millis(250),
            backoff_factor: 2.0,
            max_interval: Duration::from_secs(10),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    pub fn with_initial_interval(mut self, d: Duration) -> Self {
        self.initial_interval = d;
        self
    }

    pub fn with_max_interval(mut self, d: Duration) -> Self {
        self.max_interval = d;
        self
    }

    /// Whether a `1`-indexed attempt number should be retried.
    pub fn should_retry(&self, attempt: usize) -> bool {
        attempt < self.max_attempts
    }

    /// Delay to wait before `attempt` (1-indexed), capped at `max_interval`
    /// and optionally jittered by ±50%.
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let base = self.initial_interval.as_secs_f64() * self.backoff_factor.powi(attempt as i32 - 1);
        let capped = base.min(self.max_interval.as_secs_f64());
        let secs = if self.jitter {
            let factor = rand::thread_rng().gen_range(0.5..1.5);
            capped * factor
        } else {
            capped
        };
        Duration::from_secs_f64(secs.max(0.0))
    }

    /// Runs `op`, retrying on `Err` up to `max_attempts` times with backoff.
    /// The closure decides, via its return type, what counts as retryable;
    /// callers typically wrap only `LLMUnavailable`/`ToolTransient` paths.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if !self.should_retry(attempt) {
                        return Err(err);
                    }
                    tokio::time::sleep(self.delay_for(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn retries_until_success() {
        let policy = RetryPolicy::new(3).with_initial_interval(Duration::from_millis(1));
        let calls = AtomicUsize::new(0);

        let result: Result<&str, &str> = policy
            .run(|| async {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err("transient")
                } else {
                    Ok("done")
                }
            })
            .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let policy = RetryPolicy::new(2).with_initial_interval(Duration::from_millis(1));
        let calls = AtomicUsize::new(0);

        let result: Result<(), &str> = policy
            .run(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("still down")
            })
            .await;

        assert_eq!(result, Err("still down"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
