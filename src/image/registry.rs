//! Container registry trait

#[cfg(test)]
use mockall::automock;

use std::collections::HashSet;

use serde::Deserialize;

use crate::error::RegistryError;

/// One platform-specific image behind a registry tag
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageDescriptor {
    pub architecture: String,
    pub digest: String,
}

/// Trait for querying image metadata from a container registry
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ImageRegistry: Send + Sync {
    /// Fetches the per-architecture images published under `repository:tag`
    async fn fetch_tag_images(
        &self,
        repository: &str,
        tag: &str,
    ) -> Result<Vec<ImageDescriptor>, RegistryError>;

    /// Fetches every tag name published in `repository`, excluding `latest`
    async fn fetch_published_tags(&self, repository: &str)
    -> Result<HashSet<String>, RegistryError>;
}
