//! Release tag parsing

use std::fmt;

use semver::Version;
use thiserror::Error;

/// Marker prefixed to upstream release tags
const TAG_MARKER: char = 'v';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagParseError {
    #[error("expected MAJOR.MINOR.PATCH, got {0} part(s)")]
    WrongArity(usize),

    #[error("non-numeric component {0:?}")]
    NonNumeric(String),
}

/// An upstream release tag such as `v1.18.24`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReleaseTag {
    raw: String,
    version: Version,
}

impl ReleaseTag {
    /// Parse a raw tag, stripping a single leading `v`.
    ///
    /// Every component must consist of ASCII digits only, so pre-release
    /// suffixes and peeled refs (`v1.0.0^{}`) are rejected.
    pub fn parse(raw: &str) -> Result<Self, TagParseError> {
        let stripped = raw.strip_prefix(TAG_MARKER).unwrap_or(raw);
        let parts: Vec<&str> = stripped.split('.').collect();

        let mut numbers = [0u64; 3];
        for (i, part) in parts.iter().enumerate() {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(TagParseError::NonNumeric(part.to_string()));
            }
            if i < numbers.len() {
                numbers[i] = part
                    .parse()
                    .map_err(|_| TagParseError::NonNumeric(part.to_string()))?;
            }
        }

        if parts.len() != 3 {
            return Err(TagParseError::WrongArity(parts.len()));
        }

        Ok(Self {
            raw: raw.to_string(),
            version: Version::new(numbers[0], numbers[1], numbers[2]),
        })
    }

    /// The tag exactly as listed upstream
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The tag without its leading marker, as used for image tags
    pub fn stripped(&self) -> &str {
        self.raw.strip_prefix(TAG_MARKER).unwrap_or(&self.raw)
    }

    pub fn major(&self) -> u64 {
        self.version.major
    }

    pub fn minor(&self) -> u64 {
        self.version.minor
    }

    pub fn patch(&self) -> u64 {
        self.version.patch
    }
}

impl fmt::Display for ReleaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
