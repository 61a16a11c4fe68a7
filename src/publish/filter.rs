//! `--version` publish filter

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::release::ReleaseTag;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid version filter {0:?}: expected MAJOR.MINOR or MAJOR.MINOR.PATCH")]
pub struct InvalidVersionFilter(String);

/// Restricts publishing to one release line (`1.18`) or one release (`1.18.3`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionFilter {
    pub major: u64,
    pub minor: u64,
    pub patch: Option<u64>,
}

impl VersionFilter {
    pub fn matches(&self, tag: &ReleaseTag) -> bool {
        self.major == tag.major()
            && self.minor == tag.minor()
            && self.patch.is_none_or(|patch| patch == tag.patch())
    }
}

impl FromStr for VersionFilter {
    type Err = InvalidVersionFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidVersionFilter(s.to_string());

        let numbers = s
            .split('.')
            .map(|part| {
                if !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()) {
                    part.parse::<u64>().ok()
                } else {
                    None
                }
            })
            .collect::<Option<Vec<_>>>()
            .ok_or_else(invalid)?;

        match numbers.as_slice() {
            [major, minor] => Ok(Self {
                major: *major,
                minor: *minor,
                patch: None,
            }),
            [major, minor, patch] => Ok(Self {
                major: *major,
                minor: *minor,
                patch: Some(*patch),
            }),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for VersionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.patch {
            Some(patch) => write!(f, "{}.{}.{}", self.major, self.minor, patch),
            None => write!(f, "{}.{}", self.major, self.minor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.18", "v1.18.0", true)]
    #[case("1.18", "v1.18.26", true)]
    #[case("1.18", "v1.17.26", false)]
    #[case("1.18", "v2.18.0", false)]
    #[case("1.18.3", "v1.18.3", true)]
    #[case("1.18.3", "v1.18.30", false)]
    #[case("1.18.3", "v1.18.4", false)]
    fn matches_by_specificity(#[case] filter: &str, #[case] tag: &str, #[case] expected: bool) {
        let filter: VersionFilter = filter.parse().unwrap();
        assert_eq!(filter.matches(&ReleaseTag::parse(tag).unwrap()), expected);
    }

    #[rstest]
    #[case("1")]
    #[case("1.18.3.4")]
    #[case("v1.18")]
    #[case("1.x")]
    #[case("")]
    fn from_str_rejects_invalid_filters(#[case] input: &str) {
        assert_eq!(
            input.parse::<VersionFilter>(),
            Err(InvalidVersionFilter(input.to_string()))
        );
    }

    #[test]
    fn display_round_trips_specificity() {
        assert_eq!("1.20".parse::<VersionFilter>().unwrap().to_string(), "1.20");
        assert_eq!("2.0.1".parse::<VersionFilter>().unwrap().to_string(), "2.0.1");
    }
}
