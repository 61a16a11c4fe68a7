use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rate limited: retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum TagSourceError {
    #[error("Failed to run git: {0}")]
    Io(#[from] std::io::Error),

    #[error("git ls-remote failed for {url}: {stderr}")]
    CommandFailed { url: String, stderr: String },

    #[error("git output is not valid UTF-8")]
    InvalidOutput,
}

#[derive(Debug, Error)]
pub enum ImageIndexError {
    #[error("No {architecture} image found for Rust {channel}")]
    NoMatchingArchitecture {
        channel: String,
        architecture: String,
    },

    #[error("Registry lookup failed: {0}")]
    Registry(#[from] RegistryError),
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Failed to run docker: {0}")]
    Io(#[from] std::io::Error),

    #[error("`{command}` exited with status {status:?}")]
    CommandFailed {
        command: String,
        status: Option<i32>,
    },
}

/// Error type for file parsing operations
#[derive(Debug, Error)]
pub enum ParseError {
    /// Failed to parse the file structure
    #[error("Failed to parse file: {0}")]
    ParseFailed(String),

    /// Tree-sitter related error
    #[error("Tree-sitter error: {0}")]
    TreeSitter(String),
}
