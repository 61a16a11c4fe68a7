//! Rust compiler base images
//!
//! - [`registry`]: Registry trait for image metadata and published tags
//! - [`docker_hub`]: Docker Hub implementation
//! - [`index`]: Channel version to image digest cache

pub mod docker_hub;
pub mod index;
pub mod registry;

pub use docker_hub::DockerHubRegistry;
pub use index::CompilerImageIndex;
pub use registry::{ImageDescriptor, ImageRegistry};
