//! Bounded exponential-backoff retry helper shared by catalog operations.

use std::time::Duration;

use subcast_config::CatalogConfig;

/// Compute the delay before retry attempt `attempt` (0-indexed), capped at
/// `config.retry_max_delay`.
#[must_use]
pub fn delay_for_attempt(config: &CatalogConfig, attempt: u32) -> Duration {
    let scaled = config.retry_delay.as_secs_f64() * config.retry_exponential_base.powi(attempt.try_into().unwrap_or(i32::MAX));
    Duration::from_secs_f64(scaled).min(config.retry_max_delay)
}

/// Retry `operation` up to `config.max_retries` additional times after the
/// first attempt, sleeping `delay_for_attempt` between tries. `is_retryable`
/// decides whether a given error is worth retrying at all.
pub async fn retry_with_backoff<T, E, F, Fut, R>(
    config: &CatalogConfig,
    mut operation: F,
    is_retryable: R,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
{
    let mut attempt = 0_u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < config.max_retries && is_retryable(&err) => {
                tokio::time::sleep(delay_for_attempt(config, attempt)).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::time::Duration as StdDuration;

    fn test_config() -> CatalogConfig {
        CatalogConfig {
            user: None,
            password: None,
            user_agent: "test".into(),
            base_url: "http://localhost".into(),
            max_retries: 3,
            retry_delay: StdDuration::from_secs(1),
            retry_max_delay: StdDuration::from_secs(10),
            retry_exponential_base: 2.0,
        }
    }

    #[test]
    fn delay_grows_exponentially_then_caps() {
        let config = test_config();
        assert_eq!(delay_for_attempt(&config, 0), StdDuration::from_secs(1));
        assert_eq!(delay_for_attempt(&config, 1), StdDuration::from_secs(2));
        assert_eq!(delay_for_attempt(&config, 2), StdDuration::from_secs(4));
        assert_eq!(delay_for_attempt(&config, 10), StdDuration::from_secs(10));
    }

    #[tokio::test]
    async fn retries_until_success_within_budget() {
        let config = CatalogConfig {
            retry_delay: StdDuration::from_millis(1),
            retry_max_delay: StdDuration::from_millis(2),
            ..test_config()
        };
        let attempts = Cell::new(0_u32);
        let result: Result<&'static str, &'static str> = retry_with_backoff(
            &config,
            || {
                let count = attempts.get() + 1;
                attempts.set(count);
                async move {
                    if count < 3 {
                        Err("transient")
                    } else {
                        Ok("done")
                    }
                }
            },
            |_| true,
        )
        .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(attempts.get(), 3);
    }

    #[tokio::test]
    async fn stops_retrying_when_error_is_not_retryable() {
        let config = test_config();
        let attempts = Cell::new(0_u32);
        let result: Result<&'static str, &'static str> = retry_with_backoff(
            &config,
            || {
                attempts.set(attempts.get() + 1);
                async move { Err("fatal") }
            },
            |_| false,
        )
        .await;

        assert_eq!(result, Err("fatal"));
        assert_eq!(attempts.get(), 1);
    }
}
