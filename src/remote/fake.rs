//! In-memory backend used by the cache tests.
//!
//! Every list operation takes its snapshot of the stored entities and then
//! yields to the scheduler once before answering, so concurrent callers and
//! mutations really overlap with it. Every operation is counted.
use super::{EpisodeResource, IndexerResource, RemoteError, ShowResource};
use crate::model::{
    DownloadRequest, Episode, EpisodeId, EpisodeStatus, IndexerQuery, NewEpisode, NewShow,
    ProviderResult, QualityGroup, Show, ShowCandidate, ShowId,
};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct FakeState {
    shows: Vec<Show>,
    episodes: Vec<Episode>,
    releases: Vec<ProviderResult>,
    candidates: Vec<ShowCandidate>,
    next_id: i64,
    failing: Option<RemoteError>,
    calls: HashMap<&'static str, usize>,
}

pub(crate) struct FakeBackend {
    state: Mutex<FakeState>,
}

pub(crate) fn show(id: i64, name: &str) -> Show {
    Show {
        id: ShowId(id),
        name: name.to_string(),
        ..Show::default()
    }
}

pub(crate) fn episode(id: i64, show_id: i64, status: EpisodeStatus) -> Episode {
    Episode {
        id: EpisodeId(id),
        show_id: ShowId(show_id),
        name: format!("Episode {}", id),
        season: 1,
        episode: id,
        status,
        ..Episode::default()
    }
}

pub(crate) fn not_found() -> RemoteError {
    RemoteError::Status {
        status: 404,
        reason: "Not Found".to_string(),
        message: None,
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                next_id: 100,
                ..FakeState::default()
            }),
        }
    }

    pub fn with_shows(self, shows: Vec<Show>) -> Self {
        self.state.lock().unwrap().shows = shows;
        self
    }

    pub fn with_episodes(self, episodes: Vec<Episode>) -> Self {
        self.state.lock().unwrap().episodes = episodes;
        self
    }

    pub fn with_releases(self, releases: Vec<ProviderResult>) -> Self {
        self.state.lock().unwrap().releases = releases;
        self
    }

    pub fn with_candidates(self, candidates: Vec<ShowCandidate>) -> Self {
        self.state.lock().unwrap().candidates = candidates;
        self
    }

    /// Makes every following request fail with `error` until cleared
    pub fn fail_with(&self, error: Option<RemoteError>) {
        self.state.lock().unwrap().failing = error;
    }

    /// Number of times the named operation was invoked
    pub fn calls(&self, operation: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    /// Replaces a stored show behind the caches' back
    pub fn rename_show(&self, id: ShowId, name: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(show) = state.shows.iter_mut().find(|s| s.id == id) {
            show.name = name.to_string();
        }
    }

    fn enter(&self, operation: &'static str) -> Result<MutexGuard<'_, FakeState>, RemoteError> {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry(operation).or_insert(0) += 1;
        if let Some(error) = state.failing.clone() {
            return Err(error);
        }
        Ok(state)
    }

    fn next_id(state: &mut FakeState) -> i64 {
        state.next_id += 1;
        state.next_id
    }
}

impl ShowResource for FakeBackend {
    async fn list_shows(&self) -> Result<Vec<Show>, RemoteError> {
        let shows = self.enter("list_shows")?.shows.clone();
        tokio::task::yield_now().await;
        Ok(shows)
    }

    async fn get_show(&self, id: ShowId) -> Result<Show, RemoteError> {
        let state = self.enter("get_show")?;
        state
            .shows
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn create_show(&self, new_show: &NewShow) -> Result<Show, RemoteError> {
        let mut state = self.enter("create_show")?;
        let id = Self::next_id(&mut state);
        let created = Show {
            id: ShowId(id),
            name: format!("Show {}", new_show.indexer_id),
            indexer: new_show.indexer_name.clone(),
            indexer_id: new_show.indexer_id.parse().unwrap_or_default(),
            quality_group: new_show.quality_group.clone(),
            anime: new_show.anime,
            air_by_date: new_show.air_by_date,
            location: new_show.location.clone(),
            ..Show::default()
        };
        state.shows.push(created.clone());
        Ok(created)
    }

    async fn update_show(&self, show: &Show) -> Result<Show, RemoteError> {
        let mut state = self.enter("update_show")?;
        let stored = state
            .shows
            .iter_mut()
            .find(|s| s.id == show.id)
            .ok_or_else(not_found)?;
        *stored = show.clone();
        Ok(show.clone())
    }

    async fn delete_show(&self, id: ShowId) -> Result<(), RemoteError> {
        let mut state = self.enter("delete_show")?;
        state.shows.retain(|s| s.id != id);
        Ok(())
    }

    async fn refresh_show(&self, id: ShowId) -> Result<Show, RemoteError> {
        let mut state = self.enter("refresh_show")?;
        let stored = state
            .shows
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(not_found)?;
        stored.last_indexer_update = Some(chrono::Utc::now());
        Ok(stored.clone())
    }

    async fn rescan_show(&self, id: ShowId) -> Result<Show, RemoteError> {
        let state = self.enter("rescan_show")?;
        state
            .shows
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(not_found)
    }
}

impl EpisodeResource for FakeBackend {
    async fn list_episodes(&self, show_id: ShowId) -> Result<Vec<Episode>, RemoteError> {
        let episodes: Vec<Episode> = self
            .enter("list_episodes")?
            .episodes
            .iter()
            .filter(|e| e.show_id == show_id)
            .cloned()
            .collect();
        tokio::task::yield_now().await;
        Ok(episodes)
    }

    async fn get_episode(&self, show_id: ShowId, id: EpisodeId) -> Result<Episode, RemoteError> {
        let state = self.enter("get_episode")?;
        state
            .episodes
            .iter()
            .find(|e| e.show_id == show_id && e.id == id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn create_episode(&self, new_episode: &NewEpisode) -> Result<Episode, RemoteError> {
        let mut state = self.enter("create_episode")?;
        let id = Self::next_id(&mut state);
        let created = Episode {
            id: EpisodeId(id),
            show_id: new_episode.show_id,
            name: new_episode.name.clone(),
            season: new_episode.season,
            episode: new_episode.episode,
            airdate: new_episode.airdate,
            description: new_episode.description.clone(),
            status: new_episode.status.clone(),
            ..Episode::default()
        };
        state.episodes.push(created.clone());
        Ok(created)
    }

    async fn update_episode(&self, episode: &Episode) -> Result<Episode, RemoteError> {
        let mut state = self.enter("update_episode")?;
        let stored = state
            .episodes
            .iter_mut()
            .find(|e| e.show_id == episode.show_id && e.id == episode.id)
            .ok_or_else(not_found)?;
        *stored = episode.clone();
        Ok(episode.clone())
    }

    async fn delete_episode(&self, show_id: ShowId, id: EpisodeId) -> Result<(), RemoteError> {
        let mut state = self.enter("delete_episode")?;
        state
            .episodes
            .retain(|e| !(e.show_id == show_id && e.id == id));
        Ok(())
    }

    async fn search_episode(
        &self,
        _show_id: ShowId,
        _id: EpisodeId,
    ) -> Result<Vec<ProviderResult>, RemoteError> {
        let state = self.enter("search_episode")?;
        Ok(state.releases.clone())
    }

    async fn download_episode(
        &self,
        show_id: ShowId,
        id: EpisodeId,
        request: &DownloadRequest,
    ) -> Result<Episode, RemoteError> {
        let mut state = self.enter("download_episode")?;
        let stored = state
            .episodes
            .iter_mut()
            .find(|e| e.show_id == show_id && e.id == id)
            .ok_or_else(not_found)?;
        stored.status = EpisodeStatus::Snatched;
        stored.release_name = request.url.clone();
        Ok(stored.clone())
    }
}

impl IndexerResource for FakeBackend {
    async fn search_indexer(&self, query: &IndexerQuery) -> Result<Vec<ShowCandidate>, RemoteError> {
        let state = self.enter("search_indexer")?;
        Ok(state
            .candidates
            .iter()
            .filter(|c| c.name.contains(&query.term))
            .cloned()
            .collect())
    }

    async fn list_indexers(&self) -> Result<Vec<String>, RemoteError> {
        self.enter("list_indexers")?;
        Ok(vec!["tvdb".to_string(), "tvrage".to_string()])
    }

    async fn list_statuses(&self) -> Result<Vec<EpisodeStatus>, RemoteError> {
        self.enter("list_statuses")?;
        Ok(EpisodeStatus::KNOWN.to_vec())
    }

    async fn list_quality_groups(&self) -> Result<Vec<QualityGroup>, RemoteError> {
        self.enter("list_quality_groups")?;
        Ok(vec![QualityGroup {
            name: "HDALL".to_string(),
            qualities: vec![4, 8, 16],
            default: true,
        }])
    }
}
