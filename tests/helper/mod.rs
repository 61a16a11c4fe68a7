//! Test fakes for the external collaborators

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use verifiable_build_images::error::{BuildError, TagSourceError};
use verifiable_build_images::publish::ImageBuilder;
use verifiable_build_images::release::source::TagSource;

/// Tag source serving fixed tag lists per repository URL
#[derive(Default)]
pub struct FakeTagSource {
    tags: HashMap<String, Vec<String>>,
}

impl FakeTagSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tags(mut self, repository_url: &str, tags: Vec<&str>) -> Self {
        self.tags.insert(
            repository_url.to_string(),
            tags.into_iter().map(|t| t.to_string()).collect(),
        );
        self
    }
}

#[async_trait]
impl TagSource for FakeTagSource {
    async fn list_tags(&self, repository_url: &str) -> Result<Vec<String>, TagSourceError> {
        self.tags
            .get(repository_url)
            .cloned()
            .ok_or_else(|| TagSourceError::CommandFailed {
                url: repository_url.to_string(),
                stderr: "repository not found".to_string(),
            })
    }
}

/// Builder that records every docker invocation instead of running it
#[derive(Default)]
pub struct RecordingBuilder {
    failing_builds: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl RecordingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `docker build` fail for this local image name
    pub fn failing(mut self, image: &str) -> Self {
        self.failing_builds.push(image.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ImageBuilder for RecordingBuilder {
    async fn build(&self, image: &str, dockerfile: &Path) -> Result<(), BuildError> {
        let file_name = dockerfile
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.record(format!("build {image} {file_name}"));

        if self.failing_builds.iter().any(|failing| failing == image) {
            return Err(BuildError::CommandFailed {
                command: format!("docker build -t {image} -"),
                status: Some(1),
            });
        }
        Ok(())
    }

    async fn tag(&self, source: &str, target: &str) -> Result<(), BuildError> {
        self.record(format!("tag {source} {target}"));
        Ok(())
    }

    async fn push(&self, image: &str) -> Result<(), BuildError> {
        self.record(format!("push {image}"));
        Ok(())
    }
}
