use rand::Rng;
use std::time::Duration;

/// A simple retry policy with exponential backoff and jitter.
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    /// Retry `f` while it fails with an error `retryable` accepts.
    pub async fn retry_async<F, Fut, T, E, P>(&self, mut f: F, retryable: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
    {
        let mut attempt = 0u32;
        loop {
            match f().await {
                Ok(v) => return Ok(v),
                Err(e) => {
                    attempt += 1;
                    if attempt > self.max_retries || !retryable(&e) {
                        return Err(e);
                    }
                    let max_delay = self.base_delay * (1u32 << attempt.min(16));
                    tokio::time::sleep(jitter(max_delay)).await;
                }
            }
        }
    }
}

/// Backoff for restarting the speech recognizer after a failed cycle.
///
/// `max_consecutive_failures: None` keeps restarting forever; every
/// restart is still logged and counted by the listener.
#[derive(Clone, Debug)]
pub struct RestartPolicy {
    pub max_consecutive_failures: Option<u32>,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self {
            max_consecutive_failures: None,
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RestartPolicy {
    /// Delay before the next attempt, or `None` once the failure limit is reached.
    pub fn delay_for(&self, consecutive_failures: u32) -> Option<Duration> {
        if self
            .max_consecutive_failures
            .is_some_and(|max| consecutive_failures > max)
        {
            return None;
        }
        let shift = consecutive_failures.saturating_sub(1).min(16);
        let delay = self.base_delay.saturating_mul(1u32 << shift);
        Some(delay.min(self.max_delay))
    }
}

fn jitter(max_delay: Duration) -> Duration {
    let max_ms = max_delay.as_millis() as u64;
    if max_ms == 0 {
        return Duration::ZERO;
    }
    let mut rng = rand::rng();
    Duration::from_millis(rng.random_range(0..max_ms))
}
