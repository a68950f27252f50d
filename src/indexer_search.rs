//! Indexer lookups used while adding a show to the library

use crate::model::{EpisodeStatus, IndexerQuery, ReferenceData, ShowCandidate};
use crate::remote::{IndexerResource, RemoteError};
use std::sync::Arc;

/// Stateless coordinator for indexer searches.
///
/// Nothing is cached here: every search goes to the backend, which in turn
/// asks the external indexer.
pub struct IndexerSearch<R> {
    remote: Arc<R>,
}

impl<R> IndexerSearch<R>
where
    R: IndexerResource,
{
    pub fn new(remote: Arc<R>) -> Self {
        Self { remote }
    }

    /// Searches the indexer named in `query` for shows matching its term
    pub async fn search(&self, query: &IndexerQuery) -> Result<Vec<ShowCandidate>, RemoteError> {
        tracing::debug!(
            indexer = %query.indexer_name,
            term = %query.term,
            "Searching indexer"
        );
        let candidates = self.remote.search_indexer(query).await?;
        tracing::debug!(count = candidates.len(), "Indexer search finished");
        Ok(candidates)
    }

    /// Fetches the indexers, episode statuses and quality groups the backend
    /// knows about, concurrently
    pub async fn reference_data(&self) -> Result<ReferenceData, RemoteError> {
        let (indexers, statuses, quality_groups) = futures::try_join!(
            self.remote.list_indexers(),
            self.remote.list_statuses(),
            self.remote.list_quality_groups(),
        )?;

        Ok(ReferenceData {
            indexers,
            statuses,
            quality_groups,
        })
    }

    /// Statuses offered as the initial status of a new show's episodes
    pub fn default_statuses(&self) -> Vec<EpisodeStatus> {
        EpisodeStatus::EPISODE_DEFAULTS.to_vec()
    }
}
