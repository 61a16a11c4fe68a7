//! Rust toolchain resolution for a classified release

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::release::{ClassifiedRelease, Upstream};
use crate::toolchain::manifest::{parse_ci_stable_version, parse_toolchain_channel};
use crate::toolchain::raw_host::RawFileHost;

const TOOLCHAIN_MANIFEST_PATH: &str = "rust-toolchain.toml";
const CI_RUST_VERSION_PATH: &str = "ci/rust-version.sh";

/// Release lines whose manifests are missing or unusable, keyed by (major, minor)
const PINNED_CHANNELS: &[((u64, u64), &str)] = &[((1, 14), "1.68.0")];

/// Resolves the Rust channel a release was built with
pub struct ToolchainResolver {
    host: Arc<dyn RawFileHost>,
}

impl ToolchainResolver {
    pub fn new(host: Arc<dyn RawFileHost>) -> Self {
        Self { host }
    }

    /// Resolve the toolchain channel of `release`
    ///
    /// Tries, in order: the pinned channel table, the `rust-toolchain.toml`
    /// of the family's upstream, and `ci/rust-version.sh` of the Solana
    /// repository. Returns `None` if all of them fail.
    pub async fn resolve(&self, release: &ClassifiedRelease) -> Option<String> {
        let tag = &release.tag;

        if let Some(channel) = pinned_channel(tag.major(), tag.minor()) {
            debug!("Using pinned Rust {} for {}", channel, tag);
            return Some(channel.to_string());
        }

        let upstream = release.family.manifest_upstream();
        if let Some(channel) = self.channel_from_manifest(upstream, tag.raw()).await {
            return Some(channel);
        }

        info!("Attempting to retrieve Rust version from {} for {}", CI_RUST_VERSION_PATH, tag);
        self.channel_from_ci_script(tag.raw()).await
    }

    async fn channel_from_manifest(&self, upstream: Upstream, tag: &str) -> Option<String> {
        let content = self
            .host
            .fetch_file(upstream.slug(), tag, TOOLCHAIN_MANIFEST_PATH)
            .await
            .inspect_err(|e| warn!("Failed to fetch {} for {}: {}", TOOLCHAIN_MANIFEST_PATH, tag, e))
            .ok()?;

        match parse_toolchain_channel(&content) {
            Ok(Some(channel)) => Some(channel),
            Ok(None) => {
                warn!("No toolchain channel declared in {} for {}", TOOLCHAIN_MANIFEST_PATH, tag);
                None
            }
            Err(e) => {
                warn!("Failed to parse {} for {}: {}", TOOLCHAIN_MANIFEST_PATH, tag, e);
                None
            }
        }
    }

    async fn channel_from_ci_script(&self, tag: &str) -> Option<String> {
        let script = self
            .host
            .fetch_file(Upstream::Solana.slug(), tag, CI_RUST_VERSION_PATH)
            .await
            .inspect_err(|e| warn!("Failed to fetch {} for {}: {}", CI_RUST_VERSION_PATH, tag, e))
            .ok()?;

        let channel = parse_ci_stable_version(&script);
        if channel.is_none() {
            warn!("No stable Rust version found in {} for {}", CI_RUST_VERSION_PATH, tag);
        }
        channel
    }
}

fn pinned_channel(major: u64, minor: u64) -> Option<&'static str> {
    PINNED_CHANNELS
        .iter()
        .find(|(line, _)| *line == (major, minor))
        .map(|(_, channel)| *channel)
}
