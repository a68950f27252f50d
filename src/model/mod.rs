//! Data structures for shows and episodes as exchanged with the tv2go backend.
//!
//! This module provides the entities held by the caches (`Show`, `Episode`),
//! the drafts for entities that are still pending creation (`NewShow`,
//! `NewEpisode`) and the ephemeral search results returned by indexers and
//! providers.
mod airdate;
mod search;
mod status;

pub use search::{
    DownloadRequest, IndexerQuery, ProviderResult, QualityGroup, ReferenceData, ShowCandidate,
};
pub use status::{EpisodeStatus, UnknownStatusError};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Server-assigned identity of a show
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ShowId(pub i64);

/// Server-assigned identity of an episode
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EpisodeId(pub i64);

macro_rules! numeric_id {
    ($ty:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $ty {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map($ty)
            }
        }

        impl From<i64> for $ty {
            fn from(id: i64) -> Self {
                $ty(id)
            }
        }
    };
}

numeric_id!(ShowId);
numeric_id!(EpisodeId);

/// A show persisted by the backend.
///
/// Every `Show` carries the id the server assigned on creation. Shows that
/// have not been created yet are represented by [`NewShow`].
///
/// The status given to a new show's episodes is only part of [`NewShow`];
/// the backend does not report it back on shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Show {
    pub id: ShowId,
    pub name: String,
    /// Name of the indexer the show was added from (e.g. "tvdb"). Empty when
    /// the backend does not report it, see [`Show::indexer_label`].
    pub indexer: String,
    #[serde(rename = "indexerid")]
    pub indexer_id: i64,
    pub quality_group: String,
    pub anime: bool,
    pub air_by_date: bool,
    pub paused: bool,
    pub sports: bool,
    pub subtitles: bool,
    pub airs: String,
    pub language: String,
    pub network: String,
    pub status: String,
    pub location: String,
    #[serde(rename = "tvdbid")]
    pub tvdb_id: i64,
    pub tvrage_id: i64,
    pub tvrage_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_ep_airdate: Option<DateTime<Utc>>,
    /// When the show was last refreshed from its indexer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_indexer_update: Option<DateTime<Utc>>,
}

impl Show {
    /// Returns the indexer reference for display, e.g. `tvdb #1234`, or just
    /// `#1234` when the indexer name is unknown
    pub fn indexer_label(&self) -> String {
        if self.indexer.is_empty() {
            format!("#{}", self.indexer_id)
        } else {
            format!("{} #{}", self.indexer, self.indexer_id)
        }
    }
}

/// A show pending creation.
///
/// Starts out as an empty draft and is filled from an indexer search result
/// before being handed to `ShowCache::create_show`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewShow {
    pub indexer_name: String,
    /// Indexer specific id, sent as decimal text
    #[serde(rename = "indexerid")]
    pub indexer_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub quality_group: String,
    /// Status assigned to all episodes of the new show
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_status: Option<EpisodeStatus>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub location: String,
    #[serde(rename = "is_anime", default)]
    pub anime: bool,
    #[serde(rename = "is_air_by_date", default)]
    pub air_by_date: bool,
}

impl NewShow {
    /// Creates a draft for the given indexer search result
    pub fn from_candidate(indexer_name: &str, candidate: &ShowCandidate) -> Self {
        Self {
            indexer_name: indexer_name.to_string(),
            indexer_id: candidate.indexer_id.to_string(),
            ..Self::default()
        }
    }
}

/// A single episode of a show.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Episode {
    pub id: EpisodeId,
    #[serde(rename = "showid")]
    pub show_id: ShowId,
    pub name: String,
    pub season: i64,
    pub episode: i64,
    pub absolute_episode: i64,
    #[serde(with = "airdate")]
    pub airdate: Option<NaiveDate>,
    pub description: String,
    pub file_size: i64,
    pub file_size_human: String,
    pub location: String,
    pub quality: String,
    /// Name of the release this episode was last downloaded from
    pub release_name: String,
    pub status: EpisodeStatus,
}

impl Episode {
    /// Returns the conventional `S01E02` label
    pub fn label(&self) -> String {
        format!("S{:02}E{:02}", self.season, self.episode)
    }
}

/// An episode entered manually, pending creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewEpisode {
    #[serde(rename = "showid")]
    pub show_id: ShowId,
    pub name: String,
    pub season: i64,
    pub episode: i64,
    #[serde(with = "airdate")]
    pub airdate: Option<NaiveDate>,
    pub description: String,
    pub status: EpisodeStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_parsing() {
        assert_eq!("42".parse::<ShowId>().unwrap(), ShowId(42));
        assert_eq!(" 7 ".parse::<EpisodeId>().unwrap(), EpisodeId(7));
        assert!("abc".parse::<ShowId>().is_err());
        assert_eq!(ShowId(3).to_string(), "3");
    }

    #[test]
    fn test_show_from_backend_payload() {
        let payload = json!({
            "id": 1,
            "name": "Show1",
            "air_by_date": false,
            "airs": "Thursday 9:00 PM",
            "cache": {"Banner": 0, "Poster": 0},
            "anime": true,
            "indexerid": 1234,
            "language": "en",
            "network": "BBC",
            "next_ep_airdate": "2015-03-01T00:00:00Z",
            "paused": false,
            "quality_group": "HDALL",
            "sports": false,
            "status": "Continuing",
            "subtitles": false,
            "tvdbid": 1234,
            "tvrage_id": 0,
            "tvrage_name": "",
            "location": "/tv/Show1"
        });

        let show: Show = serde_json::from_value(payload).unwrap();
        assert_eq!(show.id, ShowId(1));
        assert_eq!(show.indexer_id, 1234);
        assert!(show.anime);
        assert_eq!(show.quality_group, "HDALL");
        assert!(show.next_ep_airdate.is_some());
        assert_eq!(show.last_indexer_update, None);
        assert_eq!(show.indexer, "");
        assert_eq!(show.indexer_label(), "#1234");

        let named = Show {
            indexer: "tvdb".to_string(),
            ..show
        };
        assert_eq!(named.indexer_label(), "tvdb #1234");
    }

    #[test]
    fn test_episode_from_backend_payload() {
        let payload = json!({
            "id": 10,
            "showid": 1,
            "name": "Pilot",
            "season": 1,
            "episode": 1,
            "absolute_episode": 1,
            "airdate": "2014-09-24",
            "description": "",
            "file_size": 0,
            "file_size_human": "",
            "location": "",
            "quality": "UNKNOWN",
            "release_name": "",
            "status": "WANTED"
        });

        let episode: Episode = serde_json::from_value(payload).unwrap();
        assert_eq!(episode.id, EpisodeId(10));
        assert_eq!(episode.show_id, ShowId(1));
        assert_eq!(episode.airdate, NaiveDate::from_ymd_opt(2014, 9, 24));
        assert_eq!(episode.status, EpisodeStatus::Wanted);
        assert_eq!(episode.label(), "S01E01");
    }

    #[test]
    fn test_episode_without_airdate() {
        let episode: Episode =
            serde_json::from_value(json!({"id": 3, "showid": 1, "airdate": ""})).unwrap();
        assert_eq!(episode.airdate, None);

        let value = serde_json::to_value(&episode).unwrap();
        assert_eq!(value["airdate"], "");
    }

    #[test]
    fn test_new_show_wire_body() {
        let candidate = ShowCandidate {
            name: "Show1".to_string(),
            indexer_id: 4567,
            ..ShowCandidate::default()
        };
        let mut draft = NewShow::from_candidate("tvdb", &candidate);
        draft.episode_status = Some(EpisodeStatus::Skipped);
        draft.anime = true;

        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["indexer_name"], "tvdb");
        assert_eq!(value["indexerid"], "4567");
        assert_eq!(value["episode_status"], "SKIPPED");
        assert_eq!(value["is_anime"], true);
        assert_eq!(value["is_air_by_date"], false);
        assert!(value.get("quality_group").is_none());
        assert!(value.get("location").is_none());
    }
}
