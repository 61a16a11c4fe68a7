use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

// =============================================================================
// Fixed constants
// =============================================================================

/// Architecture of the `rust` base image the Dockerfiles are pinned to
pub const TARGET_ARCHITECTURE: &str = "amd64";

/// Default `Accept` header for raw file fetches
pub const RAW_ACCEPT_HEADER: &str = "application/vnd.github.v3.raw";

/// Page size used when listing published tags on Docker Hub
pub const PUBLISHED_TAGS_PAGE_SIZE: u32 = 1000;

/// Base delay for rate-limit backoff when no Retry-After header is sent (1 second)
pub const RATE_LIMIT_BASE_DELAY_MS: u64 = 1_000;

/// User agent sent with every HTTP request
pub const USER_AGENT: &str = "verifiable-build-images";

/// Generator configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratorConfig {
    /// Directory the rendered Dockerfiles are written to
    pub output_dir: PathBuf,
    /// Local image name used by `docker build -t <name>:<tag>`
    pub local_image_repository: String,
    /// Docker Hub repository the images are pushed to
    pub publish_repository: String,
    /// Docker Hub repository holding the Rust compiler images
    pub compiler_image_repository: String,
    /// How many times a rate-limited request is retried (0 disables retries)
    pub rate_limit_retries: u32,
    pub endpoints: EndpointsConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("docker"),
            local_image_repository: "solana".to_string(),
            publish_repository: "solanafoundation/solana-verifiable-build".to_string(),
            compiler_image_repository: "library/rust".to_string(),
            rate_limit_retries: 0,
            endpoints: EndpointsConfig::default(),
        }
    }
}

/// Remote endpoints
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct EndpointsConfig {
    /// Git host the upstream repositories are cloned from
    pub github: String,
    /// Raw file host serving files at `<base>/<owner>/<repo>/<ref>/<path>`
    pub raw_files: String,
    /// Docker Hub API base URL
    pub docker_hub: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            github: "https://github.com".to_string(),
            raw_files: "https://raw.githubusercontent.com".to_string(),
            docker_hub: "https://hub.docker.com".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Loads the configuration from a JSON file, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Path of the rendered Dockerfile for a raw release tag
    pub fn dockerfile_path(&self, raw_tag: &str) -> PathBuf {
        self.output_dir.join(format!("{raw_tag}.Dockerfile"))
    }
}
