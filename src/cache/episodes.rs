use super::CacheError;
use super::population::Population;
use crate::model::{DownloadRequest, Episode, EpisodeId, NewEpisode, ProviderResult, Show, ShowId};
use crate::remote::EpisodeResource;
use std::sync::Arc;

/// Cache of the episodes of the show most recently looked at.
///
/// Only one show's episodes are held at a time. Asking for another show
/// drops the cached list and fetches the new one, so episodes of different
/// shows never mix.
pub struct EpisodeCache<R> {
    remote: Arc<R>,
    episodes: Population<Vec<Episode>, ShowId>,
}

impl<R> EpisodeCache<R>
where
    R: EpisodeResource,
{
    pub fn new(remote: Arc<R>) -> Self {
        Self {
            remote,
            episodes: Population::new(),
        }
    }

    /// Returns all episodes of `show_id`, fetching them on first use
    pub async fn get_episodes(&self, show_id: ShowId) -> Result<Vec<Episode>, CacheError> {
        let remote = Arc::clone(&self.remote);
        let episodes = self
            .episodes
            .get_or_fetch(show_id, move || async move {
                tracing::debug!(show_id = %show_id, "Episode cache empty, fetching episodes");
                remote.list_episodes(show_id).await
            })
            .await?;
        Ok(episodes)
    }

    /// Looks up a single episode of `show_id`; `None` when it does not exist
    pub async fn get_episode_by_id(
        &self,
        show_id: ShowId,
        id: EpisodeId,
    ) -> Result<Option<Episode>, CacheError> {
        let episodes = self.get_episodes(show_id).await?;
        Ok(episodes.into_iter().find(|episode| episode.id == id))
    }

    /// Creates a manually entered episode.
    ///
    /// The episodes of the parent show must have been fetched before.
    pub async fn create_episode(&self, new_episode: &NewEpisode) -> Result<Episode, CacheError> {
        let show_id = new_episode.show_id;
        if !self.episodes.is_populated(&show_id) {
            return Err(CacheError::EpisodesNotFetched { show_id });
        }

        let created = self.remote.create_episode(new_episode).await?;
        tracing::info!(show_id = %show_id, id = %created.id, "Created episode");

        let appended = created.clone();
        self.episodes.patch(&show_id, move |episodes| {
            if !episodes.iter().any(|episode| episode.id == appended.id) {
                episodes.push(appended);
            }
        });
        Ok(created)
    }

    /// Persists changes to a cached episode and replaces the cached copy
    /// with the backend's answer
    pub async fn update_episode(&self, episode: &Episode) -> Result<Episode, CacheError> {
        self.ensure_cached(episode.show_id, episode.id)?;

        let updated = self.remote.update_episode(episode).await?;
        tracing::info!(
            show_id = %updated.show_id,
            id = %updated.id,
            status = %updated.status,
            "Updated episode"
        );
        self.replace(&updated);
        Ok(updated)
    }

    /// Deletes a cached episode
    pub async fn delete_episode(&self, episode: &Episode) -> Result<(), CacheError> {
        self.ensure_cached(episode.show_id, episode.id)?;

        self.remote
            .delete_episode(episode.show_id, episode.id)
            .await?;
        tracing::info!(show_id = %episode.show_id, id = %episode.id, "Deleted episode");

        let deleted = episode.id;
        self.episodes.patch(&episode.show_id, move |episodes| {
            episodes.retain(|cached| cached.id != deleted);
        });
        Ok(())
    }

    /// Asks the backend's providers for releases of an episode.
    ///
    /// Results are returned as is and never cached.
    pub async fn search_episode(
        &self,
        show: &Show,
        episode: &Episode,
    ) -> Result<Vec<ProviderResult>, CacheError> {
        let releases = self.remote.search_episode(show.id, episode.id).await?;
        tracing::debug!(
            show_id = %show.id,
            id = %episode.id,
            count = releases.len(),
            "Provider search finished"
        );
        Ok(releases)
    }

    /// Downloads the chosen release of an episode.
    ///
    /// The returned episode carries the new status and release name and
    /// replaces the cached copy if there is one.
    pub async fn download_episode(
        &self,
        show: &Show,
        episode: &Episode,
        candidate: &ProviderResult,
    ) -> Result<Episode, CacheError> {
        let request = DownloadRequest::from(candidate);
        let downloaded = self
            .remote
            .download_episode(show.id, episode.id, &request)
            .await?;
        tracing::info!(
            show_id = %show.id,
            id = %downloaded.id,
            provider = %request.provider,
            "Sent release to downloader"
        );
        self.replace(&downloaded);
        Ok(downloaded)
    }

    /// Show the cached episodes belong to, if any were requested since the
    /// last reset
    pub fn show_id(&self) -> Option<ShowId> {
        self.episodes.scope()
    }

    /// Forgets the cached episodes
    pub fn reset(&self) {
        self.episodes.invalidate();
    }

    fn ensure_cached(&self, show_id: ShowId, episode_id: EpisodeId) -> Result<(), CacheError> {
        let cached = self
            .episodes
            .read(&show_id, |episodes| {
                episodes.iter().any(|episode| episode.id == episode_id)
            })
            .unwrap_or(false);
        if cached {
            Ok(())
        } else {
            Err(CacheError::EpisodeNotCached {
                show_id,
                episode_id,
            })
        }
    }

    fn replace(&self, episode: &Episode) {
        let show_id = episode.show_id;
        let episode = episode.clone();
        self.episodes.patch(&show_id, move |episodes| {
            if let Some(cached) = episodes.iter_mut().find(|cached| cached.id == episode.id) {
                *cached = episode;
            }
        });
    }
}
