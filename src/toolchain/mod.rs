//! Rust toolchain lookup for upstream releases
//!
//! - [`raw_host`]: Fetches single files of an upstream repository at a tag
//! - [`manifest`]: Parses `rust-toolchain.toml` and `ci/rust-version.sh`
//! - [`resolver`]: Combines both into a channel version per release

pub mod manifest;
pub mod raw_host;
pub mod resolver;

pub use raw_host::{GitHubRawHost, RawFileHost};
pub use resolver::ToolchainResolver;
