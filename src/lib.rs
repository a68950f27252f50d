//! tv2go client - Browse and manage a tv2go TV show library
//!
//! This library provides the client-side data layer for the tv2go backend:
//! in-memory caches for shows and episodes that coalesce concurrent fetches,
//! indexer searches for adding new shows, and provider searches and downloads
//! for individual episodes.
//!
//! Adapters (like the `tv2go` command line tool) create one [`Session`] and
//! only talk to its caches, never to the backend directly.

mod cache;
mod config;
pub mod format;
mod indexer_search;
pub mod model;
mod remote;

pub use cache::{CacheError, EpisodeCache, ShowCache};
pub use config::{ClientConfig, ConfigError, config_path};
pub use indexer_search::IndexerSearch;
pub use remote::{EpisodeResource, HttpBackend, IndexerResource, RemoteError, ShowResource};

use crate::model::{Episode, EpisodeId, Show, ShowId};
use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Top-level error type for tv2go client operations
#[derive(Debug, Error)]
pub enum Tv2goError {
    /// Error talking to the backend
    #[error("Backend error: {0}")]
    Remote(#[from] RemoteError),

    /// Error during cache operations
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Error loading or storing the configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A show or episode the user asked for does not exist
    #[error("{0}")]
    NotFound(String),
}

/// One connection to a tv2go backend plus the caches built on top of it.
///
/// The caches are shared through `Arc`, so every adapter holding a clone of
/// them observes the same data.
///
/// # Examples
///
/// ```no_run
/// use tv2go_client::{ClientConfig, Session};
///
/// # async fn run() -> Result<(), tv2go_client::Tv2goError> {
/// let session = Session::connect(&ClientConfig::default())?;
/// for show in session.shows.get_shows().await? {
///     println!("{}", show.name);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Session<R> {
    pub shows: Arc<ShowCache<R>>,
    pub episodes: Arc<EpisodeCache<R>>,
    pub indexer: IndexerSearch<R>,
}

impl<R> Session<R>
where
    R: ShowResource + EpisodeResource + IndexerResource,
{
    /// Creates a session whose caches all share `remote`
    pub fn new(remote: R) -> Self {
        let remote = Arc::new(remote);
        Self {
            shows: Arc::new(ShowCache::new(Arc::clone(&remote))),
            episodes: Arc::new(EpisodeCache::new(Arc::clone(&remote))),
            indexer: IndexerSearch::new(remote),
        }
    }

    /// Drops everything cached in this session
    pub fn reset(&self) {
        self.shows.reset();
        self.episodes.reset();
    }

    /// Makes show `id` the current show, failing with
    /// [`Tv2goError::NotFound`] if the library has no such show
    pub async fn select_show(&self, id: ShowId) -> Result<Show, Tv2goError> {
        self.shows
            .set_current_show(id)
            .await?
            .ok_or_else(|| Tv2goError::NotFound(format!("No show with id {}", id)))
    }

    /// Looks up episode `id` of show `show_id`, failing with
    /// [`Tv2goError::NotFound`] if it does not exist
    pub async fn find_episode(
        &self,
        show_id: ShowId,
        id: EpisodeId,
    ) -> Result<Episode, Tv2goError> {
        self.episodes
            .get_episode_by_id(show_id, id)
            .await?
            .ok_or_else(|| {
                Tv2goError::NotFound(format!("No episode with id {} in show {}", id, show_id))
            })
    }
}

impl Session<HttpBackend> {
    /// Creates a session talking HTTP to the backend named in `config`
    pub fn connect(config: &ClientConfig) -> Result<Self, RemoteError> {
        tracing::debug!(base_url = %config.base_url, "Connecting to backend");
        let backend = HttpBackend::new(&config.base_url, config.timeout())?;
        Ok(Self::new(backend))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EpisodeStatus;
    use crate::remote::fake::{FakeBackend, episode, show};

    #[tokio::test]
    async fn test_missing_entities_are_not_found_errors() {
        let backend = FakeBackend::new()
            .with_shows(vec![show(1, "X")])
            .with_episodes(vec![episode(10, 1, EpisodeStatus::Wanted)]);
        let session = Session::new(backend);

        let selected = session.select_show(ShowId(1)).await.unwrap();
        assert_eq!(selected.name, "X");
        let found = session.find_episode(ShowId(1), EpisodeId(10)).await.unwrap();
        assert_eq!(found.id, EpisodeId(10));

        let error = session.select_show(ShowId(9)).await.unwrap_err();
        assert!(matches!(error, Tv2goError::NotFound(_)));
        assert_eq!(error.to_string(), "No show with id 9");
        assert_eq!(session.shows.current_show_id(), None);

        let error = session
            .find_episode(ShowId(1), EpisodeId(99))
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "No episode with id 99 in show 1");
    }

    #[tokio::test]
    async fn test_session_caches_share_one_backend() {
        let backend = FakeBackend::new()
            .with_shows(vec![show(1, "X")])
            .with_episodes(vec![episode(10, 1, EpisodeStatus::Wanted)]);
        let session = Session::new(backend);

        let current = session.shows.set_current_show(ShowId(1)).await.unwrap();
        let episodes = session.episodes.get_episodes(ShowId(1)).await.unwrap();

        assert_eq!(current.map(|s| s.name), Some("X".to_string()));
        assert_eq!(episodes.len(), 1);

        session.reset();
        assert_eq!(session.shows.current_show(), None);
    }

    #[test]
    fn test_connect_uses_configured_url() {
        let config = ClientConfig {
            base_url: "http://media-box:9001/api/1/".to_string(),
            ..ClientConfig::default()
        };
        let session = Session::connect(&config);
        assert!(session.is_ok());
    }

    #[test]
    fn test_error_conversion() {
        let error: Tv2goError = CacheError::EpisodesNotFetched { show_id: ShowId(4) }.into();
        assert_eq!(
            error.to_string(),
            "Cache error: Episodes of show 4 have not been fetched yet"
        );
    }
}
