//! Decides which rendered Dockerfiles to build and pushes the results

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{info, warn};

use crate::error::BuildError;
use crate::pipeline::RenderedDefinition;
use crate::publish::builder::ImageBuilder;
use crate::publish::filter::VersionFilter;
use crate::release::ReleaseTag;

/// What to do with one rendered Dockerfile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishDecision {
    /// Excluded by the version filter
    Filtered,
    /// Already published and unchanged
    UpToDate,
    /// Build and push; `forced` when selected by the version filter
    Build { forced: bool },
}

/// Decide whether `tag` needs to be built
pub fn decide(
    tag: &ReleaseTag,
    filter: Option<&VersionFilter>,
    published: &HashSet<String>,
    dirty: &HashSet<String>,
) -> PublishDecision {
    if let Some(filter) = filter {
        return if filter.matches(tag) {
            PublishDecision::Build { forced: true }
        } else {
            PublishDecision::Filtered
        };
    }

    let stripped = tag.stripped();
    if published.contains(stripped) && !dirty.contains(stripped) {
        PublishDecision::UpToDate
    } else {
        PublishDecision::Build { forced: false }
    }
}

/// Outcome of a publish run, by stripped tag
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub pushed: Vec<String>,
    pub filtered: Vec<String>,
    pub up_to_date: Vec<String>,
    pub failed: Vec<String>,
}

pub struct Publisher {
    builder: Arc<dyn ImageBuilder>,
    local_repository: String,
    publish_repository: String,
}

impl Publisher {
    pub fn new(
        builder: Arc<dyn ImageBuilder>,
        local_repository: &str,
        publish_repository: &str,
    ) -> Self {
        Self {
            builder,
            local_repository: local_repository.to_string(),
            publish_repository: publish_repository.to_string(),
        }
    }

    /// Build and push every definition that needs it, in insertion order
    ///
    /// A failed build, tag or push is logged and the remaining tags are
    /// still processed.
    pub async fn publish(
        &self,
        definitions: &IndexMap<String, RenderedDefinition>,
        published: &HashSet<String>,
        dirty: &HashSet<String>,
        filter: Option<&VersionFilter>,
    ) -> PublishReport {
        let mut report = PublishReport::default();

        for definition in definitions.values() {
            let stripped = definition.tag.stripped().to_string();

            match decide(&definition.tag, filter, published, dirty) {
                PublishDecision::Filtered => {
                    info!("Skipping {}", stripped);
                    report.filtered.push(stripped);
                }
                PublishDecision::UpToDate => {
                    info!("Already built image for {}, skipping", stripped);
                    report.up_to_date.push(stripped);
                }
                PublishDecision::Build { forced } => {
                    if forced {
                        info!("Forcing build of {}", stripped);
                    } else if dirty.contains(&stripped) {
                        info!("Dockerfile for {} needs to be rebuilt", stripped);
                    }

                    match self.build_and_push(definition).await {
                        Ok(()) => report.pushed.push(stripped),
                        Err(e) => {
                            warn!("Failed to publish {}: {}", stripped, e);
                            report.failed.push(stripped);
                        }
                    }
                }
            }
        }

        report
    }

    async fn build_and_push(&self, definition: &RenderedDefinition) -> Result<(), BuildError> {
        let stripped = definition.tag.stripped();
        let local_image = format!("{}:{}", self.local_repository, stripped);
        let remote_image = format!("{}:{}", self.publish_repository, stripped);

        info!("Building {} from {}", local_image, definition.path.display());
        self.builder.build(&local_image, &definition.path).await?;
        self.builder.tag(&local_image, &remote_image).await?;
        self.builder.push(&remote_image).await?;
        info!("Pushed {}", remote_image);

        Ok(())
    }
}
