//! Raw file host (raw.githubusercontent.com) client

#[cfg(test)]
use mockall::automock;

use tracing::warn;

use crate::config::RAW_ACCEPT_HEADER;
use crate::error::RegistryError;
use crate::http::{RetryPolicy, build_client, get_with_retry};

/// Default base URL for raw file fetches
const DEFAULT_BASE_URL: &str = "https://raw.githubusercontent.com";

/// Trait for fetching a single file of a repository at a given ref
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait RawFileHost: Send + Sync {
    /// Fetches `path` of `repository` (`owner/repo`) at `git_ref`
    async fn fetch_file(
        &self,
        repository: &str,
        git_ref: &str,
        path: &str,
    ) -> Result<String, RegistryError>;
}

/// [`RawFileHost`] backed by the GitHub raw content endpoint
pub struct GitHubRawHost {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl GitHubRawHost {
    /// Creates a new GitHubRawHost with a custom base URL
    pub fn new(base_url: &str, retry: RetryPolicy) -> Self {
        Self {
            client: build_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
            retry,
        }
    }
}

impl Default for GitHubRawHost {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, RetryPolicy::default())
    }
}

#[async_trait::async_trait]
impl RawFileHost for GitHubRawHost {
    async fn fetch_file(
        &self,
        repository: &str,
        git_ref: &str,
        path: &str,
    ) -> Result<String, RegistryError> {
        let url = format!("{}/{}/{}/{}", self.base_url, repository, git_ref, path);

        let response = get_with_retry(
            &self.client,
            &url,
            &[("Accept", RAW_ACCEPT_HEADER)],
            self.retry,
        )
        .await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(url));
        }

        if !status.is_success() {
            warn!("Raw file host returned status {}: {}", status, url);
            return Err(RegistryError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        Ok(response.text().await?)
    }
}
