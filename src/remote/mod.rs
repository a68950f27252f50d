//! Remote resource client for the tv2go REST backend.
//!
//! The backend is described by one trait per entity type. The caches are
//! generic over these traits, which keeps the transport separate from the
//! data and lets tests substitute an in-memory backend.
#[cfg(test)]
pub(crate) mod fake;
mod http;

pub use http::HttpBackend;

use crate::model::{
    DownloadRequest, Episode, EpisodeId, EpisodeStatus, IndexerQuery, NewEpisode, NewShow,
    ProviderResult, QualityGroup, Show, ShowCandidate, ShowId,
};
use std::future::Future;
use thiserror::Error;

/// A failed request against the backend.
///
/// All failures of the transport are reported through this one type so that
/// callers can treat them uniformly. It is `Clone` because a single failed
/// fetch may be reported to several coalesced callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The request could not be sent or no response was received
    #[error("Request failed: {0}")]
    Transport(String),

    /// The backend answered with a non-success status
    #[error("HTTP {status} {reason}{}", message_suffix(.message))]
    Status {
        status: u16,
        reason: String,
        /// Message from the backend's error envelope, if present
        message: Option<String>,
    },

    /// The response body could not be decoded
    #[error("Failed to parse API response: {0}")]
    Decode(String),
}

fn message_suffix(message: &Option<String>) -> String {
    message
        .as_ref()
        .map(|message| format!(": {message}"))
        .unwrap_or_default()
}

impl RemoteError {
    /// Returns the human readable status description of the failure
    pub fn status_text(&self) -> String {
        match self {
            RemoteError::Transport(text) | RemoteError::Decode(text) => text.clone(),
            RemoteError::Status {
                reason, message, ..
            } => message.clone().unwrap_or_else(|| reason.clone()),
        }
    }

    /// Returns the HTTP status code, if the backend answered at all
    pub fn status_code(&self) -> Option<u16> {
        match self {
            RemoteError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Show collection at `/shows`.
pub trait ShowResource: Send + Sync + 'static {
    /// Lists all shows in the library
    fn list_shows(&self) -> impl Future<Output = Result<Vec<Show>, RemoteError>> + Send;

    fn get_show(&self, id: ShowId) -> impl Future<Output = Result<Show, RemoteError>> + Send;

    /// Adds a show; the backend assigns the id
    fn create_show(
        &self,
        show: &NewShow,
    ) -> impl Future<Output = Result<Show, RemoteError>> + Send;

    fn update_show(&self, show: &Show)
    -> impl Future<Output = Result<Show, RemoteError>> + Send;

    fn delete_show(&self, id: ShowId) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Reloads the show's metadata from its indexer
    fn refresh_show(&self, id: ShowId)
    -> impl Future<Output = Result<Show, RemoteError>> + Send;

    /// Matches the files in the show's directory to its episodes
    fn rescan_show(&self, id: ShowId) -> impl Future<Output = Result<Show, RemoteError>> + Send;
}

/// Episode collections nested below `/shows/{showid}/episodes`.
pub trait EpisodeResource: Send + Sync + 'static {
    /// Lists all episodes of one show
    fn list_episodes(
        &self,
        show_id: ShowId,
    ) -> impl Future<Output = Result<Vec<Episode>, RemoteError>> + Send;

    fn get_episode(
        &self,
        show_id: ShowId,
        id: EpisodeId,
    ) -> impl Future<Output = Result<Episode, RemoteError>> + Send;

    fn create_episode(
        &self,
        episode: &NewEpisode,
    ) -> impl Future<Output = Result<Episode, RemoteError>> + Send;

    /// Persists the full episode, keyed by its show id and id
    fn update_episode(
        &self,
        episode: &Episode,
    ) -> impl Future<Output = Result<Episode, RemoteError>> + Send;

    fn delete_episode(
        &self,
        show_id: ShowId,
        id: EpisodeId,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Asks the configured providers for releases of one episode
    fn search_episode(
        &self,
        show_id: ShowId,
        id: EpisodeId,
    ) -> impl Future<Output = Result<Vec<ProviderResult>, RemoteError>> + Send;

    /// Fetches a release from a provider; returns the updated episode
    fn download_episode(
        &self,
        show_id: ShowId,
        id: EpisodeId,
        request: &DownloadRequest,
    ) -> impl Future<Output = Result<Episode, RemoteError>> + Send;
}

/// Indexer lookups and reference data at `/indexers`, `/statuses` and
/// `/quality_groups`.
pub trait IndexerResource: Send + Sync + 'static {
    fn search_indexer(
        &self,
        query: &IndexerQuery,
    ) -> impl Future<Output = Result<Vec<ShowCandidate>, RemoteError>> + Send;

    fn list_indexers(&self) -> impl Future<Output = Result<Vec<String>, RemoteError>> + Send;

    fn list_statuses(
        &self,
    ) -> impl Future<Output = Result<Vec<EpisodeStatus>, RemoteError>> + Send;

    fn list_quality_groups(
        &self,
    ) -> impl Future<Output = Result<Vec<QualityGroup>, RemoteError>> + Send;
}
