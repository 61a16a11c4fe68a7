//! Image publishing
//!
//! - [`filter`]: The `--version` filter
//! - [`builder`]: Build/tag/push backend (the `docker` CLI)
//! - [`publisher`]: Per-tag publish decisions and the publish loop

pub mod builder;
pub mod filter;
pub mod publisher;

pub use builder::{DockerCli, ImageBuilder};
pub use filter::VersionFilter;
pub use publisher::{PublishDecision, PublishReport, Publisher};
