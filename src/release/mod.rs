//! Upstream releases: tag discovery and classification
//!
//! # Modules
//!
//! - [`source`]: Lists the tags of an upstream repository
//! - [`tag`]: Parses raw tags into `MAJOR.MINOR.PATCH`
//! - [`classifier`]: Decides which release family (or skip) a tag belongs to

pub mod classifier;
pub mod source;
pub mod tag;

pub use classifier::{ClassifiedRelease, ReleaseFamily, SkipReason, classify};
pub use tag::ReleaseTag;

/// Upstream code repositories releases are discovered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Upstream {
    /// solana-labs/solana
    Solana,
    /// anza-xyz/agave, the fork that took over from 1.18.24
    Agave,
}

impl Upstream {
    /// Upstreams in the order their tags are processed
    pub const ALL: [Upstream; 2] = [Upstream::Solana, Upstream::Agave];

    /// `owner/repo` slug on GitHub
    pub fn slug(&self) -> &'static str {
        match self {
            Upstream::Solana => "solana-labs/solana",
            Upstream::Agave => "anza-xyz/agave",
        }
    }

    /// Git URL of the repository under the given host
    pub fn git_url(&self, github_base: &str) -> String {
        format!("{}/{}", github_base.trim_end_matches('/'), self.slug())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn git_url_joins_host_and_slug() {
        assert_eq!(
            Upstream::Agave.git_url("https://github.com/"),
            "https://github.com/anza-xyz/agave"
        );
        assert_eq!(
            Upstream::Solana.git_url("https://github.com"),
            "https://github.com/solana-labs/solana"
        );
    }
}
