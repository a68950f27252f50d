use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when parsing a status name that the client does not know
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown episode status: {0}")]
pub struct UnknownStatusError(pub String);

/// Download state of an episode.
///
/// The backend serializes statuses as upper-case names. Names this client
/// does not know are preserved in [`EpisodeStatus::Other`] so they survive a
/// read-modify-write cycle unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EpisodeStatus {
    #[default]
    Unknown,
    Unaired,
    Snatched,
    Wanted,
    Downloaded,
    Skipped,
    Archived,
    Ignored,
    SnatchedProper,
    Subtitled,
    Failed,
    SnatchedBest,
    Other(String),
}

impl EpisodeStatus {
    /// All statuses known to the client, in backend order
    pub const KNOWN: [EpisodeStatus; 12] = [
        EpisodeStatus::Unknown,
        EpisodeStatus::Unaired,
        EpisodeStatus::Snatched,
        EpisodeStatus::Wanted,
        EpisodeStatus::Downloaded,
        EpisodeStatus::Skipped,
        EpisodeStatus::Archived,
        EpisodeStatus::Ignored,
        EpisodeStatus::SnatchedProper,
        EpisodeStatus::Subtitled,
        EpisodeStatus::Failed,
        EpisodeStatus::SnatchedBest,
    ];

    /// Statuses offered as the default for the episodes of a new show
    pub const EPISODE_DEFAULTS: [EpisodeStatus; 3] = [
        EpisodeStatus::Wanted,
        EpisodeStatus::Skipped,
        EpisodeStatus::Ignored,
    ];

    /// Returns the wire name of the status
    pub fn as_str(&self) -> &str {
        match self {
            EpisodeStatus::Unknown => "UNKNOWN",
            EpisodeStatus::Unaired => "UNAIRED",
            EpisodeStatus::Snatched => "SNATCHED",
            EpisodeStatus::Wanted => "WANTED",
            EpisodeStatus::Downloaded => "DOWNLOADED",
            EpisodeStatus::Skipped => "SKIPPED",
            EpisodeStatus::Archived => "ARCHIVED",
            EpisodeStatus::Ignored => "IGNORED",
            EpisodeStatus::SnatchedProper => "SNATCHED_PROPER",
            EpisodeStatus::Subtitled => "SUBTITLED",
            EpisodeStatus::Failed => "FAILED",
            EpisodeStatus::SnatchedBest => "SNATCHED_BEST",
            EpisodeStatus::Other(name) => name,
        }
    }

    fn known(name: &str) -> Option<Self> {
        Self::KNOWN
            .iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(name))
            .cloned()
    }
}

impl From<String> for EpisodeStatus {
    fn from(name: String) -> Self {
        Self::known(name.trim()).unwrap_or(EpisodeStatus::Other(name))
    }
}

impl From<EpisodeStatus> for String {
    fn from(status: EpisodeStatus) -> Self {
        match status {
            EpisodeStatus::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

/// Strict parsing for user input; only known statuses are accepted
impl FromStr for EpisodeStatus {
    type Err = UnknownStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::known(s.trim()).ok_or_else(|| UnknownStatusError(s.to_string()))
    }
}

impl fmt::Display for EpisodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
