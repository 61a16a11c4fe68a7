//! Release classification
//!
//! Maps a raw tag to the release family whose image template and toolchain
//! manifest apply, or to the reason it is skipped.

use thiserror::Error;

use crate::release::tag::{ReleaseTag, TagParseError};
use crate::release::Upstream;

/// Tags that are not valid releases or were yanked
pub const SKIPPED_TAGS: &[&str] = &[
    "v1.14.0", "v1.10.0", "v1.10.16", "v1.10.18", "v1.10.27", "v1.10.36", "v1.10.37",
    "v1.11.7", "v1.11.8", "v1.11.9", "v1.13.0",
];

/// Release family a tag belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleaseFamily {
    /// Solana 1.10 - 1.14, whose bundled installer is broken
    PreFifteen,
    /// Solana 1.15 up to 1.18.23
    SolanaStandard,
    /// Agave fork: 1.18.24 and later, and every 2.x+ release
    Agave,
}

impl ReleaseFamily {
    /// Upstream repository the toolchain manifest is fetched from
    pub fn manifest_upstream(&self) -> Upstream {
        match self {
            ReleaseFamily::PreFifteen | ReleaseFamily::SolanaStandard => Upstream::Solana,
            ReleaseFamily::Agave => Upstream::Agave,
        }
    }
}

/// Why a tag produces no image
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("malformed tag: {0}")]
    Malformed(#[from] TagParseError),

    #[error("the whole 1.15 line was yanked")]
    YankedLine,

    #[error("yanked or invalid release")]
    Yanked,

    #[error("releases before 1.10 are not built")]
    TooOld,

    #[error("does not match any Solana or Agave release range")]
    Unmatched,
}

/// A tag that passed classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedRelease {
    pub tag: ReleaseTag,
    pub family: ReleaseFamily,
}

type Outcome = Result<ReleaseFamily, SkipReason>;

struct Rule {
    matches: fn(&ReleaseTag) -> bool,
    outcome: Outcome,
}

/// Evaluated top to bottom; the first match wins.
const RULES: &[Rule] = &[
    Rule {
        matches: |t| t.major() == 1 && t.minor() == 15,
        outcome: Err(SkipReason::YankedLine),
    },
    Rule {
        matches: |t| SKIPPED_TAGS.iter().any(|skipped| *skipped == t.raw()),
        outcome: Err(SkipReason::Yanked),
    },
    Rule {
        matches: |t| t.major() == 1 && t.minor() < 10,
        outcome: Err(SkipReason::TooOld),
    },
    Rule {
        matches: |t| t.major() == 1 && (10..15).contains(&t.minor()),
        outcome: Ok(ReleaseFamily::PreFifteen),
    },
    Rule {
        matches: |t| t.major() == 1 && t.minor() >= 15 && !is_agave_1_18(t),
        outcome: Ok(ReleaseFamily::SolanaStandard),
    },
    Rule {
        matches: |t| is_agave_1_18(t) || t.major() >= 2,
        outcome: Ok(ReleaseFamily::Agave),
    },
];

/// 1.18.24 was the first 1.18 patch released from the Agave fork
fn is_agave_1_18(tag: &ReleaseTag) -> bool {
    tag.major() == 1 && tag.minor() == 18 && tag.patch() >= 24
}

/// Classify a raw tag into its release family
pub fn classify(raw: &str) -> Result<ClassifiedRelease, SkipReason> {
    let tag = ReleaseTag::parse(raw)?;

    let family = RULES
        .iter()
        .find(|rule| (rule.matches)(&tag))
        .map(|rule| rule.outcome.clone())
        .unwrap_or(Err(SkipReason::Unmatched))?;

    Ok(ClassifiedRelease { tag, family })
}
