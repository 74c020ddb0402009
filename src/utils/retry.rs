//! Retry logic for transient HTTP failures.
//!
//! Collectors retry a request a small, fixed number of times with
//! jittered exponential backoff. Only transient failures are retried; a
//! 4xx (other than 429) will not get better on a second attempt.

use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;

/// Initial backoff delay in milliseconds.
const BACKOFF_BASE_MS: u64 = 100;

/// Number of retry attempts after the initial try.
const RETRY_ATTEMPTS: usize = 2;

/// Whether a reqwest failure is worth retrying.
///
/// Timeouts, connect failures, 429 and 5xx responses are transient;
/// other client errors, redirect loops and decode failures are
/// permanent.
pub fn is_retriable(error: &reqwest::Error) -> bool {
    if let Some(status) = error.status() {
        let code = status.as_u16();
        if code == 429 {
            return true;
        }
        if (400..500).contains(&code) {
            return false;
        }
        if (500..600).contains(&code) {
            return true;
        }
    }
    if error.is_redirect() || error.is_decode() {
        return false;
    }
    error.is_timeout() || error.is_connect() || error.is_request()
}

/// Sends a freshly-built request per attempt, retrying transient
/// failures with jittered exponential backoff. Non-2xx responses come
/// back as errors so callers handle one failure path.
pub async fn get_with_retry<F>(build: F) -> Result<reqwest::Response, reqwest::Error>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let strategy = ExponentialBackoff::from_millis(BACKOFF_BASE_MS)
        .map(jitter)
        .take(RETRY_ATTEMPTS);

    RetryIf::spawn(
        strategy,
        || async { build().send().await?.error_for_status() },
        is_retriable,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_with_retry_gives_up_on_dead_endpoint() {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(300))
            .build()
            .unwrap();
        // TEST-NET-1 address; connection will fail or time out.
        let result = get_with_retry(|| client.get("http://192.0.2.1:9/")).await;
        assert!(result.is_err());
    }
}
