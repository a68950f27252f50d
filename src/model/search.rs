use super::EpisodeStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Query against one of the backend's metadata indexers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexerQuery {
    pub indexer_name: String,
    /// Free text search term
    #[serde(rename = "name")]
    pub term: String,
}

impl IndexerQuery {
    pub fn new(indexer_name: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            indexer_name: indexer_name.into(),
            term: term.into(),
        }
    }
}

/// A show found on an indexer that may be added to the library.
///
/// The backend answers indexer searches with show-shaped records whose `id`
/// is meaningless, so only the indexer side of the record is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowCandidate {
    pub name: String,
    #[serde(rename = "indexerid")]
    pub indexer_id: i64,
    pub language: String,
    pub network: String,
    pub status: String,
    pub airs: String,
    #[serde(rename = "tvdbid")]
    pub tvdb_id: i64,
    pub tvrage_id: i64,
    pub tvrage_name: String,
}

/// A release offered by a download provider for one episode
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderResult {
    /// Release type, "nzb" or "torrent"
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<DateTime<Utc>>,
    pub name: String,
    pub size: i64,
    pub quality: String,
    /// Name of the provider that returned the release
    #[serde(rename = "indexer")]
    pub provider: String,
    pub url: String,
}

/// Body of a download request for a chosen release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRequest {
    pub provider: String,
    pub url: String,
}

impl From<&ProviderResult> for DownloadRequest {
    fn from(result: &ProviderResult) -> Self {
        Self {
            provider: result.provider.clone(),
            url: result.url.clone(),
        }
    }
}

/// A named set of acceptable qualities
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityGroup {
    pub name: String,
    pub qualities: Vec<i64>,
    pub default: bool,
}

/// Enumerations needed while creating a show
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceData {
    pub indexers: Vec<String>,
    pub statuses: Vec<EpisodeStatus>,
    pub quality_groups: Vec<QualityGroup>,
}

impl ReferenceData {
    /// Returns the quality group flagged as default, if any
    pub fn default_quality_group(&self) -> Option<&QualityGroup> {
        self.quality_groups.iter().find(|group| group.default)
    }
}
