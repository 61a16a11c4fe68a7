//! Dockerfile generation for every upstream release

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use indexmap::IndexMap;
use tracing::{debug, error, info, warn};

use crate::config::{GeneratorConfig, TARGET_ARCHITECTURE};
use crate::image::{CompilerImageIndex, ImageRegistry};
use crate::release::source::TagSource;
use crate::release::{ClassifiedRelease, ReleaseTag, Upstream, classify};
use crate::render::render;
use crate::toolchain::ToolchainResolver;
use crate::tracker::ChangeTracker;

/// A Dockerfile written for one release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDefinition {
    pub tag: ReleaseTag,
    pub path: PathBuf,
}

/// Result of a generation run
#[derive(Debug, Default)]
pub struct GenerationOutcome {
    /// Written Dockerfiles keyed by raw tag, in processing order
    pub definitions: IndexMap<String, RenderedDefinition>,
    /// Stripped tags whose Dockerfile changed in this run
    pub dirty: HashSet<String>,
}

/// Collaborators the generator talks to
pub struct Generator {
    config: GeneratorConfig,
    tags: Arc<dyn TagSource>,
    registry: Arc<dyn ImageRegistry>,
    resolver: ToolchainResolver,
    images: CompilerImageIndex,
    tracker: ChangeTracker,
}

impl Generator {
    pub fn new(
        config: GeneratorConfig,
        tags: Arc<dyn TagSource>,
        registry: Arc<dyn ImageRegistry>,
        resolver: ToolchainResolver,
    ) -> Self {
        let images =
            CompilerImageIndex::seeded(&config.compiler_image_repository, TARGET_ARCHITECTURE);
        Self {
            config,
            tags,
            registry,
            resolver,
            images,
            tracker: ChangeTracker::new(),
        }
    }

    /// List the tags of every upstream and write a Dockerfile for each buildable release
    ///
    /// Only a failed tag listing aborts the run; every per-tag failure is
    /// logged and the tag is left out of the outcome.
    pub async fn run(mut self) -> anyhow::Result<GenerationOutcome> {
        let mut definitions = IndexMap::new();
        let mut seen = HashSet::new();

        for upstream in Upstream::ALL {
            let url = upstream.git_url(&self.config.endpoints.github);
            let tags = self
                .tags
                .list_tags(&url)
                .await
                .with_context(|| format!("Failed to list tags of {}", url))?;
            info!("Found {} tags in {}", tags.len(), upstream.slug());

            for raw in tags {
                if !seen.insert(raw.clone()) {
                    debug!("{} already processed", raw);
                    continue;
                }
                if let Some(definition) = self.process_release(&raw).await {
                    definitions.insert(raw, definition);
                }
            }
        }

        info!("Compiler images: {:?}", self.images.entries());

        Ok(GenerationOutcome {
            definitions,
            dirty: self.tracker.into_dirty(),
        })
    }

    async fn process_release(&mut self, raw: &str) -> Option<RenderedDefinition> {
        let release: ClassifiedRelease = classify(raw)
            .inspect_err(|reason| info!("Skipping {}: {}", raw, reason))
            .ok()?;

        let Some(channel) = self.resolver.resolve(&release).await else {
            warn!("Skipping {} due to missing Rust version", raw);
            return None;
        };
        info!("Generating Dockerfile for {} with Rust version {}", raw, channel);

        let digest = self
            .images
            .resolve(self.registry.as_ref(), &channel)
            .await
            .inspect_err(|e| warn!("Skipping {}: failed to fetch Rust image: {}", raw, e))
            .ok()?;

        let dockerfile = render(release.family, &digest, &release.tag);
        let path = self.config.dockerfile_path(release.tag.raw());

        if let Err(e) = self.tracker.persist(&release.tag, &path, &dockerfile) {
            error!("Failed to write {}: {}", path.display(), e);
            return None;
        }

        Some(RenderedDefinition {
            tag: release.tag,
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RegistryError, TagSourceError};
    use crate::image::ImageDescriptor;
    use crate::image::registry::MockImageRegistry;
    use crate::release::source::MockTagSource;
    use crate::toolchain::raw_host::MockRawFileHost;
    use mockall::predicate::eq;
    use tempfile::TempDir;

    fn config(temp_dir: &TempDir) -> GeneratorConfig {
        GeneratorConfig {
            output_dir: temp_dir.path().join("docker"),
            ..Default::default()
        }
    }

    fn tag_source(solana: Vec<&'static str>, agave: Vec<&'static str>) -> MockTagSource {
        let mut source = MockTagSource::new();
        source.expect_list_tags().returning(move |url| {
            let tags = if url.ends_with("solana-labs/solana") {
                &solana
            } else {
                &agave
            };
            Ok(tags.iter().map(|t| t.to_string()).collect())
        });
        source
    }

    fn raw_host() -> MockRawFileHost {
        let mut host = MockRawFileHost::new();
        host.expect_fetch_file()
            .returning(|_, tag, path| match (tag, path) {
                ("v1.17.3", "rust-toolchain.toml") => {
                    Ok("[toolchain]\nchannel = \"1.73.0\"\n".to_string())
                }
                ("v2.0.1", "rust-toolchain.toml") => {
                    Ok("[toolchain]\nchannel = \"1.78.0\"\n".to_string())
                }
                _ => Err(RegistryError::NotFound(format!("{tag}/{path}"))),
            });
        host
    }

    fn registry() -> MockImageRegistry {
        let mut registry = MockImageRegistry::new();
        registry
            .expect_fetch_tag_images()
            .returning(|_, channel| match channel {
                "1.73.0" | "1.78.0" => Ok(vec![ImageDescriptor {
                    architecture: "amd64".to_string(),
                    digest: format!("sha256:{channel}"),
                }]),
                _ => Err(RegistryError::NotFound(channel.to_string())),
            });
        registry
    }

    #[tokio::test]
    async fn run_writes_dockerfiles_for_buildable_releases_only() {
        let temp_dir = TempDir::new().unwrap();
        let generator = Generator::new(
            config(&temp_dir),
            Arc::new(tag_source(
                vec!["v1.15.0", "v1.17.3", "v1.14.5", "v1.16.9", "nightly"],
                vec!["v1.17.3", "v2.0.1"],
            )),
            Arc::new(registry()),
            ToolchainResolver::new(Arc::new(raw_host())),
        );

        let outcome = generator.run().await.unwrap();

        let tags: Vec<&str> = outcome.definitions.keys().map(String::as_str).collect();
        assert_eq!(tags, vec!["v1.17.3", "v1.14.5", "v2.0.1"]);
        assert_eq!(
            outcome.dirty,
            HashSet::from([
                "1.17.3".to_string(),
                "1.14.5".to_string(),
                "2.0.1".to_string()
            ])
        );

        let agave = std::fs::read_to_string(temp_dir.path().join("docker/v2.0.1.Dockerfile"))
            .unwrap();
        assert!(agave.starts_with("FROM --platform=linux/amd64 rust@sha256:1.78.0\n"));
        assert!(agave.contains("https://release.anza.xyz/v2.0.1/install"));

        let pinned = std::fs::read_to_string(temp_dir.path().join("docker/v1.14.5.Dockerfile"))
            .unwrap();
        assert!(pinned.contains(crate::image::index::SEED_ENTRY.1));
        assert!(!temp_dir.path().join("docker/v1.16.9.Dockerfile").exists());
    }

    #[tokio::test]
    async fn run_fails_when_tag_listing_fails() {
        let temp_dir = TempDir::new().unwrap();
        let mut source = MockTagSource::new();
        source.expect_list_tags().returning(|url| {
            Err(TagSourceError::CommandFailed {
                url: url.to_string(),
                stderr: "fatal: unable to access".to_string(),
            })
        });

        let generator = Generator::new(
            config(&temp_dir),
            Arc::new(source),
            Arc::new(MockImageRegistry::new()),
            ToolchainResolver::new(Arc::new(MockRawFileHost::new())),
        );

        assert!(generator.run().await.is_err());
    }

    #[tokio::test]
    async fn run_never_resolves_skipped_releases() {
        let temp_dir = TempDir::new().unwrap();
        let mut host = MockRawFileHost::new();
        host.expect_fetch_file().never();
        let mut registry = MockImageRegistry::new();
        registry.expect_fetch_tag_images().never();

        let generator = Generator::new(
            config(&temp_dir),
            Arc::new(tag_source(
                vec!["v1.15.0", "v1.14.0", "v1.9.0", "nightly"],
                vec![],
            )),
            Arc::new(registry),
            ToolchainResolver::new(Arc::new(host)),
        );

        let outcome = generator.run().await.unwrap();

        assert!(outcome.definitions.is_empty());
        assert!(outcome.dirty.is_empty());
    }

    #[tokio::test]
    async fn run_processes_a_tag_listed_by_both_upstreams_once() {
        let temp_dir = TempDir::new().unwrap();
        let mut host = MockRawFileHost::new();
        host.expect_fetch_file()
            .with(eq("solana-labs/solana"), eq("v1.16.0"), eq("rust-toolchain.toml"))
            .times(1)
            .returning(|_, tag, path| Err(RegistryError::NotFound(format!("{tag}/{path}"))));
        host.expect_fetch_file()
            .with(eq("solana-labs/solana"), eq("v1.16.0"), eq("ci/rust-version.sh"))
            .times(1)
            .returning(|_, tag, path| Err(RegistryError::NotFound(format!("{tag}/{path}"))));
        let mut registry = MockImageRegistry::new();
        registry.expect_fetch_tag_images().never();

        let generator = Generator::new(
            config(&temp_dir),
            Arc::new(tag_source(vec!["v1.16.0"], vec!["v1.16.0"])),
            Arc::new(registry),
            ToolchainResolver::new(Arc::new(host)),
        );

        let outcome = generator.run().await.unwrap();

        assert!(outcome.definitions.is_empty());
    }
}
