//! Docker Hub API registry implementation

use std::collections::HashSet;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::PUBLISHED_TAGS_PAGE_SIZE;
use crate::error::RegistryError;
use crate::http::{RetryPolicy, build_client, get_with_retry};
use crate::image::registry::{ImageDescriptor, ImageRegistry};

/// Default base URL for the Docker Hub API
const DEFAULT_BASE_URL: &str = "https://hub.docker.com";

/// Namespace of Docker official images
const OFFICIAL_NAMESPACE: &str = "library";

/// Tag that never names a release
const LATEST_TAG: &str = "latest";

/// Response from the single-tag endpoint
#[derive(Debug, Deserialize)]
struct TagResponse {
    #[serde(default)]
    images: Vec<ImageDescriptor>,
}

/// One page from the tag-listing endpoint
#[derive(Debug, Deserialize)]
struct TagPage {
    #[serde(default)]
    next: Option<String>,
    results: Vec<TagSummary>,
}

#[derive(Debug, Deserialize)]
struct TagSummary {
    name: String,
}

/// Registry implementation for the Docker Hub v2 API
pub struct DockerHubRegistry {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl DockerHubRegistry {
    /// Creates a new DockerHubRegistry with a custom base URL
    pub fn new(base_url: &str, retry: RetryPolicy) -> Self {
        Self {
            client: build_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
            retry,
        }
    }

    /// Split `namespace/name`, defaulting to the official-image namespace
    fn split_repository(repository: &str) -> (&str, &str) {
        repository
            .split_once('/')
            .unwrap_or((OFFICIAL_NAMESPACE, repository))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        subject: &str,
    ) -> Result<T, RegistryError> {
        let response = get_with_retry(&self.client, url, &[], self.retry).await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(subject.to_string()));
        }

        if !status.is_success() {
            warn!("Docker Hub returned status {}: {}", status, url);
            return Err(RegistryError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        response.json().await.map_err(|e| {
            warn!("Failed to parse Docker Hub response: {}", e);
            RegistryError::InvalidResponse(e.to_string())
        })
    }
}

impl Default for DockerHubRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, RetryPolicy::default())
    }
}

#[async_trait::async_trait]
impl ImageRegistry for DockerHubRegistry {
    async fn fetch_tag_images(
        &self,
        repository: &str,
        tag: &str,
    ) -> Result<Vec<ImageDescriptor>, RegistryError> {
        let (namespace, name) = Self::split_repository(repository);
        let url = format!(
            "{}/v2/namespaces/{}/repositories/{}/tags/{}",
            self.base_url, namespace, name, tag
        );

        let response: TagResponse = self
            .get_json(&url, &format!("{}:{}", repository, tag))
            .await?;

        Ok(response.images)
    }

    async fn fetch_published_tags(
        &self,
        repository: &str,
    ) -> Result<HashSet<String>, RegistryError> {
        let (namespace, name) = Self::split_repository(repository);
        let mut next_url = Some(format!(
            "{}/v2/namespaces/{}/repositories/{}/tags?page_size={}",
            self.base_url, namespace, name, PUBLISHED_TAGS_PAGE_SIZE
        ));

        let mut tags = HashSet::new();
        while let Some(url) = next_url {
            let page: TagPage = self.get_json(&url, repository).await?;
            debug!("Fetched {} tags from {}", page.results.len(), url);

            tags.extend(
                page.results
                    .into_iter()
                    .map(|summary| summary.name)
                    .filter(|name| name != LATEST_TAG),
            );
            next_url = page.next;
        }

        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn fetch_tag_images_returns_images_of_tag() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/v2/namespaces/library/repositories/rust/tags/1.75.0")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "name": "1.75.0",
                    "images": [
                        {"architecture": "arm64", "digest": "sha256:arm"},
                        {"architecture": "amd64", "digest": "sha256:amd"}
                    ]
                }"#,
            )
            .create_async()
            .await;

        let registry = DockerHubRegistry::new(&server.url(), RetryPolicy::default());
        let images = registry
            .fetch_tag_images("library/rust", "1.75.0")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            images,
            vec![
                ImageDescriptor {
                    architecture: "arm64".to_string(),
                    digest: "sha256:arm".to_string()
                },
                ImageDescriptor {
                    architecture: "amd64".to_string(),
                    digest: "sha256:amd".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn fetch_tag_images_defaults_to_official_namespace() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/v2/namespaces/library/repositories/rust/tags/1.80.0")
            .with_status(200)
            .with_body(r#"{"images": []}"#)
            .create_async()
            .await;

        let registry = DockerHubRegistry::new(&server.url(), RetryPolicy::default());
        let images = registry.fetch_tag_images("rust", "1.80.0").await.unwrap();

        mock.assert_async().await;
        assert!(images.is_empty());
    }

    #[tokio::test]
    async fn fetch_tag_images_returns_not_found_for_unknown_tag() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/v2/namespaces/library/repositories/rust/tags/9.9.9")
            .with_status(404)
            .with_body(r#"{"message": "object not found"}"#)
            .create_async()
            .await;

        let registry = DockerHubRegistry::new(&server.url(), RetryPolicy::default());
        let result = registry.fetch_tag_images("library/rust", "9.9.9").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(RegistryError::NotFound(_))));
    }

    #[tokio::test]
    async fn fetch_published_tags_follows_pages_and_drops_latest() {
        let mut server = Server::new_async().await;
        let second_page = format!(
            "{}/v2/namespaces/solanafoundation/repositories/solana-verifiable-build/tags?page=2",
            server.url()
        );

        let first = server
            .mock(
                "GET",
                "/v2/namespaces/solanafoundation/repositories/solana-verifiable-build/tags",
            )
            .match_query(Matcher::UrlEncoded("page_size".into(), "1000".into()))
            .with_status(200)
            .with_body(format!(
                r#"{{"next": "{}", "results": [{{"name": "latest"}}, {{"name": "1.18.24"}}]}}"#,
                second_page
            ))
            .create_async()
            .await;
        let second = server
            .mock(
                "GET",
                "/v2/namespaces/solanafoundation/repositories/solana-verifiable-build/tags",
            )
            .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
            .with_status(200)
            .with_body(r#"{"next": null, "results": [{"name": "2.0.1"}]}"#)
            .create_async()
            .await;

        let registry = DockerHubRegistry::new(&server.url(), RetryPolicy::default());
        let tags = registry
            .fetch_published_tags("solanafoundation/solana-verifiable-build")
            .await
            .unwrap();

        first.assert_async().await;
        second.assert_async().await;
        assert_eq!(
            tags,
            HashSet::from(["1.18.24".to_string(), "2.0.1".to_string()])
        );
    }

    #[tokio::test]
    async fn fetch_published_tags_reports_rate_limit() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock(
                "GET",
                "/v2/namespaces/solanafoundation/repositories/solana-verifiable-build/tags",
            )
            .match_query(Matcher::Any)
            .with_status(429)
            .with_header("retry-after", "30")
            .create_async()
            .await;

        let registry = DockerHubRegistry::new(&server.url(), RetryPolicy::default());
        let result = registry
            .fetch_published_tags("solanafoundation/solana-verifiable-build")
            .await;

        mock.assert_async().await;
        assert!(matches!(
            result,
            Err(RegistryError::RateLimited {
                retry_after_secs: Some(30)
            })
        ));
    }
}
