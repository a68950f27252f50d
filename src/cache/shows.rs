use super::CacheError;
use super::population::Population;
use crate::model::{NewShow, Show, ShowId};
use crate::remote::ShowResource;
use std::sync::{Arc, Mutex, PoisonError};

/// Cache of all shows in the library plus the show currently being viewed.
///
/// The show list is fetched once and then served from memory. Creating,
/// updating, refreshing or rescanning a show goes to the backend first and
/// the returned show is merged into the cached list afterwards.
pub struct ShowCache<R> {
    remote: Arc<R>,
    shows: Population<Vec<Show>>,
    /// Weak reference into `shows`; resolved on every access
    current_show_id: Mutex<Option<ShowId>>,
}

impl<R> ShowCache<R>
where
    R: ShowResource,
{
    /// Creates an empty cache on top of the given backend
    pub fn new(remote: Arc<R>) -> Self {
        Self {
            remote,
            shows: Population::new(),
            current_show_id: Mutex::new(None),
        }
    }

    /// Returns all shows, fetching them from the backend on first use.
    ///
    /// Callers arriving while the first fetch is still running share that
    /// fetch; the backend is asked exactly once.
    pub async fn get_shows(&self) -> Result<Vec<Show>, CacheError> {
        let remote = Arc::clone(&self.remote);
        let shows = self
            .shows
            .get_or_fetch((), move || async move {
                tracing::debug!("Show cache empty, fetching shows");
                remote.list_shows().await
            })
            .await?;
        Ok(shows)
    }

    /// Looks up a show by id.
    ///
    /// A missing id is not an error and resolves to `None`.
    pub async fn get_show_by_id(&self, id: ShowId) -> Result<Option<Show>, CacheError> {
        let shows = self.get_shows().await?;
        Ok(shows.into_iter().find(|show| show.id == id))
    }

    /// Selects the show the user is viewing.
    ///
    /// Returns the selected show, or `None` (clearing the selection) if the
    /// id is unknown.
    pub async fn set_current_show(&self, id: ShowId) -> Result<Option<Show>, CacheError> {
        let show = self.get_show_by_id(id).await?;
        *self.current_id_lock() = show.as_ref().map(|show| show.id);
        Ok(show)
    }

    /// Returns the current show, if one is selected and still cached
    pub fn current_show(&self) -> Option<Show> {
        let id = self.current_show_id()?;
        self.shows
            .read(&(), |shows| shows.iter().find(|show| show.id == id).cloned())
            .flatten()
    }

    pub fn current_show_id(&self) -> Option<ShowId> {
        *self.current_id_lock()
    }

    /// Name of the current show, or an empty string if none is selected
    pub fn current_show_name(&self) -> String {
        self.current_show()
            .map(|show| show.name)
            .unwrap_or_default()
    }

    /// Adds a show to the library.
    ///
    /// The show returned by the backend, carrying its new id, is appended to
    /// the cached list, also when the list is still being fetched. On failure
    /// the cache is left untouched.
    pub async fn create_show(&self, new_show: &NewShow) -> Result<Show, CacheError> {
        let created = self.remote.create_show(new_show).await?;
        tracing::info!(id = %created.id, name = %created.name, "Created show");

        let appended = created.clone();
        self.shows.patch(&(), move |shows| {
            if !shows.iter().any(|show| show.id == appended.id) {
                shows.push(appended);
            }
        });
        Ok(created)
    }

    /// Persists changes to a show and replaces the cached copy
    pub async fn update_show(&self, show: &Show) -> Result<Show, CacheError> {
        let updated = self.remote.update_show(show).await?;
        tracing::info!(id = %updated.id, "Updated show");
        self.replace(&updated);
        Ok(updated)
    }

    /// Asks the backend to reload the show from its indexer.
    ///
    /// The cached copy is replaced with the backend's answer when present;
    /// callers are free to ignore the result.
    pub async fn refresh_from_indexer(&self, show: &Show) -> Result<Show, CacheError> {
        let refreshed = self.remote.refresh_show(show.id).await?;
        tracing::info!(id = %refreshed.id, "Refreshed show from indexer");
        self.replace(&refreshed);
        Ok(refreshed)
    }

    /// Asks the backend to match files on disk to the show's episodes
    pub async fn rescan_from_disk(&self, show: &Show) -> Result<Show, CacheError> {
        let rescanned = self.remote.rescan_show(show.id).await?;
        tracing::info!(id = %rescanned.id, "Rescanned show from disk");
        self.replace(&rescanned);
        Ok(rescanned)
    }

    /// Forgets all cached shows and the current selection
    pub fn reset(&self) {
        self.shows.invalidate();
        *self.current_id_lock() = None;
    }

    fn replace(&self, show: &Show) {
        let show = show.clone();
        self.shows.patch(&(), move |shows| {
            if let Some(cached) = shows.iter_mut().find(|cached| cached.id == show.id) {
                *cached = show;
            }
        });
    }

    fn current_id_lock(&self) -> std::sync::MutexGuard<'_, Option<ShowId>> {
        self.current_show_id
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
