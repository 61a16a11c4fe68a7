//! Image build/tag/push backend

#[cfg(test)]
use mockall::automock;

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::BuildError;

/// Trait for building and publishing container images
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ImageBuilder: Send + Sync {
    /// Builds `image` using the Dockerfile at `dockerfile` as the whole build context
    async fn build(&self, image: &str, dockerfile: &Path) -> Result<(), BuildError>;

    /// Adds the name `target` to the local image `source`
    async fn tag(&self, source: &str, target: &str) -> Result<(), BuildError>;

    /// Pushes `image` to its registry
    async fn push(&self, image: &str) -> Result<(), BuildError>;
}

/// [`ImageBuilder`] driving the `docker` CLI
#[derive(Debug)]
pub struct DockerCli {
    program: String,
}

impl DockerCli {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }

    async fn run(&self, args: &[&str], stdin: Stdio) -> Result<(), BuildError> {
        let command = format!("{} {}", self.program, args.join(" "));
        debug!("Running {}", command);

        let status = Command::new(&self.program)
            .args(args)
            .stdin(stdin)
            .status()
            .await?;

        if status.success() {
            Ok(())
        } else {
            Err(BuildError::CommandFailed {
                command,
                status: status.code(),
            })
        }
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new("docker")
    }
}

#[async_trait::async_trait]
impl ImageBuilder for DockerCli {
    async fn build(&self, image: &str, dockerfile: &Path) -> Result<(), BuildError> {
        // `docker build -` reads the Dockerfile from stdin with an empty context
        let file = std::fs::File::open(dockerfile)?;
        self.run(&["build", "-t", image, "-"], Stdio::from(file))
            .await
    }

    async fn tag(&self, source: &str, target: &str) -> Result<(), BuildError> {
        self.run(&["tag", source, target], Stdio::null()).await
    }

    async fn push(&self, image: &str) -> Result<(), BuildError> {
        self.run(&["push", image], Stdio::null()).await
    }
}
