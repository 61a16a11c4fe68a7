//! Shared HTTP helpers for the registry and raw-file clients

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use tracing::{debug, warn};

use crate::config::{RATE_LIMIT_BASE_DELAY_MS, USER_AGENT};
use crate::error::RegistryError;

/// Retry policy applied to rate-limited (429) responses only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_millis(RATE_LIMIT_BASE_DELAY_MS),
        }
    }

    /// Delay before retry number `attempt` (0-based), preferring the server's Retry-After
    fn delay(&self, attempt: u32, retry_after_secs: Option<u64>) -> Duration {
        match retry_after_secs {
            Some(secs) => Duration::from_secs(secs),
            None => self.base_delay.saturating_mul(2u32.saturating_pow(attempt)),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(0)
    }
}

pub fn build_client() -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .expect("Failed to create HTTP client")
}

/// Sends a GET request and maps 429 to [`RegistryError::RateLimited`],
/// retrying up to `policy.max_retries` times before giving up.
///
/// Any other status is returned to the caller untouched.
pub async fn get_with_retry(
    client: &Client,
    url: &str,
    headers: &[(&str, &str)],
    policy: RetryPolicy,
) -> Result<Response, RegistryError> {
    let mut attempt = 0;
    loop {
        let mut request = client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let response = request.send().await?;

        if response.status() != StatusCode::TOO_MANY_REQUESTS {
            return Ok(response);
        }

        let retry_after_secs = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());

        if attempt >= policy.max_retries {
            warn!("Rate limited by {}", url);
            return Err(RegistryError::RateLimited { retry_after_secs });
        }

        let delay = policy.delay(attempt, retry_after_secs);
        debug!(
            "Rate limited by {}, retrying in {:?} (attempt {}/{})",
            url,
            delay,
            attempt + 1,
            policy.max_retries
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
