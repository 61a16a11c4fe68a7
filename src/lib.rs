//! Generates Dockerfiles for Solana and Agave verifiable builds and publishes them
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Release   │────▶│  Toolchain  │────▶│    Image    │────▶│   Render    │
//! │ (tags,class)│     │  (channel)  │     │  (digest)   │     │ (Dockerfile)│
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!                                                                    │
//!                     ┌─────────────┐     ┌─────────────┐            │
//!                     │   Publish   │◀────│   Tracker   │◀───────────┘
//!                     │(docker push)│     │ (dirty set) │
//!                     └─────────────┘     └─────────────┘
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod image;
pub mod logging;
pub mod pipeline;
pub mod publish;
pub mod release;
pub mod render;
pub mod toolchain;
pub mod tracker;
