//! Tag listing for upstream repositories

#[cfg(test)]
use mockall::automock;

use tokio::process::Command;
use tracing::debug;

use crate::error::TagSourceError;

/// Trait for listing the version tags of a repository
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait TagSource: Send + Sync {
    /// Lists all tags of the repository at `repository_url`
    ///
    /// # Returns
    /// * `Ok(Vec<String>)` - Tag names in the order the remote reported them
    /// * `Err(TagSourceError)` - If the listing fails
    async fn list_tags(&self, repository_url: &str) -> Result<Vec<String>, TagSourceError>;
}

/// Lists tags with the system `git ls-remote`
#[derive(Debug, Default)]
pub struct GitRemoteTagSource;

#[async_trait::async_trait]
impl TagSource for GitRemoteTagSource {
    async fn list_tags(&self, repository_url: &str) -> Result<Vec<String>, TagSourceError> {
        debug!("Listing tags of {}", repository_url);

        let output = Command::new("git")
            .args(["ls-remote", "--tags", repository_url])
            .output()
            .await?;

        if !output.status.success() {
            return Err(TagSourceError::CommandFailed {
                url: repository_url.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8(output.stdout).map_err(|_| TagSourceError::InvalidOutput)?;
        Ok(parse_ls_remote(&stdout))
    }
}

/// Extract tag names from `git ls-remote --tags` output
///
/// Each line is `<sha>\trefs/tags/<name>`; peeled entries keep their `^{}`
/// suffix and are rejected later by tag parsing.
pub fn parse_ls_remote(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.split_once('\t'))
        .filter_map(|(_, reference)| reference.rsplit('/').next())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
