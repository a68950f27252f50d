//! HTTP implementation of the remote resource traits.
use super::{EpisodeResource, IndexerResource, RemoteError, ShowResource};
use crate::model::{
    DownloadRequest, Episode, EpisodeId, EpisodeStatus, IndexerQuery, NewEpisode, NewShow,
    ProviderResult, QualityGroup, Show, ShowCandidate, ShowId,
};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Error body sent by the backend alongside non-success statuses
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    message: String,
}

/// Remote resource client talking JSON over HTTP to the tv2go backend.
///
/// The base URL includes the API prefix, e.g. `http://localhost:9001/api/1`.
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Creates a backend client for the given base URL.
    ///
    /// Every request is aborted after `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Returns the base URL all resource paths are appended to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        tracing::debug!(method = %method, url = %url, "Sending request");
        self.client.request(method, url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, RemoteError> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "Request to backend failed");
            RemoteError::Transport(e.to_string())
        })?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let error = status_error(status.as_u16(), status.canonical_reason(), &body);
        tracing::warn!(error = %error, "Backend returned an error");
        Err(error)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, RemoteError> {
        self.send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

/// Builds the error for a non-success response.
///
/// The backend usually answers with `{"message": ..., "result": "failure"}`,
/// but some handlers send a bare JSON string instead.
fn status_error(status: u16, reason: Option<&str>, body: &str) -> RemoteError {
    let body = body.trim();
    let message = if body.is_empty() {
        None
    } else if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        Some(envelope.message)
    } else if let Ok(text) = serde_json::from_str::<String>(body) {
        Some(text)
    } else {
        Some(body.to_string())
    };

    RemoteError::Status {
        status,
        reason: reason.unwrap_or("Unknown").to_string(),
        message: message.filter(|m| !m.is_empty()),
    }
}

fn show_path(id: ShowId) -> String {
    format!("shows/{}", id)
}

fn episodes_path(show_id: ShowId) -> String {
    format!("shows/{}/episodes", show_id)
}

fn episode_path(show_id: ShowId, id: EpisodeId) -> String {
    format!("shows/{}/episodes/{}", show_id, id)
}

impl ShowResource for HttpBackend {
    async fn list_shows(&self) -> Result<Vec<Show>, RemoteError> {
        self.fetch(self.request(Method::GET, "shows")).await
    }

    async fn get_show(&self, id: ShowId) -> Result<Show, RemoteError> {
        self.fetch(self.request(Method::GET, &show_path(id))).await
    }

    async fn create_show(&self, show: &NewShow) -> Result<Show, RemoteError> {
        self.fetch(self.request(Method::POST, "shows").json(show))
            .await
    }

    async fn update_show(&self, show: &Show) -> Result<Show, RemoteError> {
        self.fetch(self.request(Method::PUT, &show_path(show.id)).json(show))
            .await
    }

    async fn delete_show(&self, id: ShowId) -> Result<(), RemoteError> {
        self.send(self.request(Method::DELETE, &show_path(id)))
            .await
            .map(|_| ())
    }

    async fn refresh_show(&self, id: ShowId) -> Result<Show, RemoteError> {
        let path = format!("{}/update", show_path(id));
        self.fetch(self.request(Method::GET, &path)).await
    }

    async fn rescan_show(&self, id: ShowId) -> Result<Show, RemoteError> {
        let path = format!("{}/rescan", show_path(id));
        self.fetch(self.request(Method::GET, &path)).await
    }
}

impl EpisodeResource for HttpBackend {
    async fn list_episodes(&self, show_id: ShowId) -> Result<Vec<Episode>, RemoteError> {
        self.fetch(self.request(Method::GET, &episodes_path(show_id)))
            .await
    }

    async fn get_episode(&self, show_id: ShowId, id: EpisodeId) -> Result<Episode, RemoteError> {
        self.fetch(self.request(Method::GET, &episode_path(show_id, id)))
            .await
    }

    async fn create_episode(&self, episode: &NewEpisode) -> Result<Episode, RemoteError> {
        let path = episodes_path(episode.show_id);
        self.fetch(self.request(Method::POST, &path).json(episode))
            .await
    }

    async fn update_episode(&self, episode: &Episode) -> Result<Episode, RemoteError> {
        let path = episode_path(episode.show_id, episode.id);
        self.fetch(self.request(Method::PUT, &path).json(episode))
            .await
    }

    async fn delete_episode(&self, show_id: ShowId, id: EpisodeId) -> Result<(), RemoteError> {
        self.send(self.request(Method::DELETE, &episode_path(show_id, id)))
            .await
            .map(|_| ())
    }

    async fn search_episode(
        &self,
        show_id: ShowId,
        id: EpisodeId,
    ) -> Result<Vec<ProviderResult>, RemoteError> {
        let path = format!("{}/search", episode_path(show_id, id));
        self.fetch(self.request(Method::GET, &path)).await
    }

    async fn download_episode(
        &self,
        show_id: ShowId,
        id: EpisodeId,
        request: &DownloadRequest,
    ) -> Result<Episode, RemoteError> {
        let path = format!("{}/download", episode_path(show_id, id));
        self.fetch(self.request(Method::POST, &path).json(request))
            .await
    }
}

impl IndexerResource for HttpBackend {
    async fn search_indexer(&self, query: &IndexerQuery) -> Result<Vec<ShowCandidate>, RemoteError> {
        self.fetch(self.request(Method::GET, "indexers/search").query(query))
            .await
    }

    async fn list_indexers(&self) -> Result<Vec<String>, RemoteError> {
        self.fetch(self.request(Method::GET, "indexers")).await
    }

    async fn list_statuses(&self) -> Result<Vec<EpisodeStatus>, RemoteError> {
        self.fetch(self.request(Method::GET, "statuses")).await
    }

    async fn list_quality_groups(&self) -> Result<Vec<QualityGroup>, RemoteError> {
        self.fetch(self.request(Method::GET, "quality_groups"))
            .await
    }
}
