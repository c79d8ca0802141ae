// Bounded exponential backoff for API calls
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    max_retries: u32,
    initial_delay: Duration,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
            max_delay,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Delay before retry number `retry_index` (0-based): `initial * 2^index`, capped
    pub fn delay_for(&self, retry_index: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry_index);
        self.initial_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }

    pub async fn execute<F, Fut, T, E>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut retry_index = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(err) if retry_index >= self.max_retries => {
                    warn!(
                        "Operation failed after {} attempts: {}",
                        retry_index + 1,
                        err
                    );
                    return Err(err);
                }
                Err(err) => {
                    let delay = self.delay_for(retry_index);
                    warn!(
                        "Operation failed (attempt {}): {}, retrying in {:?}",
                        retry_index + 1,
                        err,
                        delay
                    );
                    sleep(delay).await;
                    retry_index += 1;
                }
            }
        }
    }
}
