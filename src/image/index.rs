//! Per-run cache of Rust compiler image digests

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::{debug, info};

use crate::error::ImageIndexError;
use crate::image::registry::ImageRegistry;

/// Digest known up front for the channel pinned to the 1.14 line
pub const SEED_ENTRY: (&str, &str) = (
    "1.68.0",
    "sha256:79892de83d1af9109c47a4566a24a0b240348bb8c088f1bccc52645c4c70ec39",
);

/// Maps a Rust channel version to the digest of its compiler image
///
/// Entries are only ever added, and only for channels without one, so a
/// channel never resolves to two different digests within a run. Failed
/// lookups are not cached.
#[derive(Debug)]
pub struct CompilerImageIndex {
    repository: String,
    architecture: String,
    digests: HashMap<String, String>,
}

impl CompilerImageIndex {
    /// Creates an empty index for images of `repository` built for `architecture`
    pub fn new(repository: &str, architecture: &str) -> Self {
        Self {
            repository: repository.to_string(),
            architecture: architecture.to_string(),
            digests: HashMap::new(),
        }
    }

    /// Creates an index holding [`SEED_ENTRY`]
    pub fn seeded(repository: &str, architecture: &str) -> Self {
        let mut index = Self::new(repository, architecture);
        index
            .digests
            .insert(SEED_ENTRY.0.to_string(), SEED_ENTRY.1.to_string());
        index
    }

    pub fn get(&self, channel: &str) -> Option<&str> {
        self.digests.get(channel).map(String::as_str)
    }

    pub fn entries(&self) -> &HashMap<String, String> {
        &self.digests
    }

    /// Returns the digest for `channel`, querying `registry` the first time it is seen
    pub async fn resolve(
        &mut self,
        registry: &dyn ImageRegistry,
        channel: &str,
    ) -> Result<String, ImageIndexError> {
        if let Some(digest) = self.get(channel) {
            debug!("Reusing cached image {} for Rust {}", digest, channel);
            return Ok(digest.to_string());
        }

        let images = registry.fetch_tag_images(&self.repository, channel).await?;

        let digest = images
            .into_iter()
            .find(|image| image.architecture == self.architecture)
            .map(|image| image.digest)
            .ok_or_else(|| ImageIndexError::NoMatchingArchitecture {
                channel: channel.to_string(),
                architecture: self.architecture.clone(),
            })?;

        info!("Resolved Rust {} to {}", channel, digest);
        let digest = match self.digests.entry(channel.to_string()) {
            Entry::Occupied(existing) => existing.get().clone(),
            Entry::Vacant(slot) => slot.insert(digest).clone(),
        };
        Ok(digest)
    }
}
