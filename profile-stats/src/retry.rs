// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Retry utilities with exponential backoff for fatal-path API calls.
///
/// Only the repository listing is retried: a failure there aborts the run,
/// while per-repository requests are contained by the aggregator instead.
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::Error;

/// Configuration for retry behavior with exponential backoff.
#[derive(Debug, Clone,)]
pub struct RetryConfig
{
    /// Maximum number of attempts, including the first one (default: 3).
    pub max_attempts:     u32,
    /// Initial delay between retries in milliseconds (default: 1000).
    pub initial_delay_ms: u64,
    /// Multiplier for exponential backoff (default: 2.0).
    pub backoff_factor:   f64,
}

impl Default for RetryConfig
{
    fn default() -> Self
    {
        Self {
            max_attempts: 3, initial_delay_ms: 1000, backoff_factor: 2.0,
        }
    }
}

impl RetryConfig
{
    /// Configuration that performs a single attempt.
    pub fn no_retry() -> Self
    {
        Self {
            max_attempts: 1, initial_delay_ms: 0, backoff_factor: 1.0,
        }
    }
}

/// Executes an async operation with exponential backoff retry logic.
///
/// # Arguments
///
/// * `config` - Retry configuration (max attempts, delays)
/// * `operation_name` - Name of the operation for logging
/// * `f` - Async function to retry
///
/// # Errors
///
/// Returns the last error encountered if all retry attempts fail.
///
/// # Example
///
/// ```no_run
/// use profile_stats::{Error, RetryConfig, retry_with_backoff};
///
/// # async fn example() -> Result<(), Error> {
/// let config = RetryConfig::default();
/// let value = retry_with_backoff(&config, "fetch data", || async { Ok::<_, Error,>(42,) },)
///     .await?;
/// assert_eq!(value, 42);
/// # Ok(())
/// # }
/// ```
pub async fn retry_with_backoff<F, Fut, T,>(
    config: &RetryConfig,
    operation_name: &str,
    mut f: F,
) -> Result<T, Error,>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, Error,>,>,
{
    let max_attempts = config.max_attempts.max(1,);
    let mut attempt = 1;
    let mut delay_ms = config.initial_delay_ms;

    loop {
        match f().await {
            Ok(result,) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}", operation_name, attempt);
                }
                return Ok(result,);
            }
            Err(error,) => {
                if attempt >= max_attempts {
                    warn!("{} failed after {} attempts: {}", operation_name, max_attempts, error);
                    return Err(error,);
                }

                warn!(
                    "{} failed on attempt {}/{}: {}. Retrying in {}ms...",
                    operation_name, attempt, max_attempts, error, delay_ms
                );

                sleep(Duration::from_millis(delay_ms,),).await;
                delay_ms = (delay_ms as f64 * config.backoff_factor) as u64;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests
{
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn retry_config_default_values()
    {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.initial_delay_ms, 1000);
        assert_eq!(config.backoff_factor, 2.0);
    }

    #[tokio::test]
    async fn retry_succeeds_on_first_attempt()
    {
        let config = RetryConfig::default();
        let result = retry_with_backoff(&config, "test", || async { Ok::<_, Error,>(42,) },)
            .await
            .expect("should succeed",);
        assert_eq!(result, 42);
    }

    #[tokio::test]
    async fn retry_succeeds_after_failures()
    {
        let config =
            RetryConfig {
                max_attempts: 3, initial_delay_ms: 10, backoff_factor: 2.0,
            };
        let counter = Arc::new(Mutex::new(0,),);
        let counter_clone = counter.clone();

        let result = retry_with_backoff(&config, "test", move || {
            let counter = counter_clone.clone();
            async move {
                let mut count = counter.lock().unwrap();
                *count += 1;
                if *count < 3 { Err(Error::service("temporary failure",),) } else { Ok(42,) }
            }
        },)
        .await
        .expect("should succeed after retries",);

        assert_eq!(result, 42);
        assert_eq!(*counter.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn no_retry_performs_single_attempt()
    {
        let config = RetryConfig::no_retry();
        let counter = Arc::new(Mutex::new(0,),);
        let counter_clone = counter.clone();

        let result = retry_with_backoff(&config, "test", move || {
            let counter = counter_clone.clone();
            async move {
                *counter.lock().unwrap() += 1;
                Err::<i32, _,>(Error::service("persistent failure",),)
            }
        },)
        .await;

        assert!(result.is_err());
        assert_eq!(*counter.lock().unwrap(), 1);
    }
}
