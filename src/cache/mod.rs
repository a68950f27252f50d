//! In-memory caches for shows and episodes
//!
//! The caches are the single source of truth for what the user currently
//! sees. Reads are served from memory once populated; mutations are sent to
//! the backend first and only patched into memory after the backend accepted
//! them.
mod episodes;
mod population;
mod shows;

pub use episodes::EpisodeCache;
pub use shows::ShowCache;

use crate::model::{EpisodeId, ShowId};
use crate::remote::RemoteError;
use thiserror::Error;

/// Errors that can occur during cache operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The backend request failed
    #[error("{0}")]
    Remote(#[from] RemoteError),

    /// An episode mutation was attempted before the show's episodes were fetched
    #[error("Episodes of show {show_id} have not been fetched yet")]
    EpisodesNotFetched { show_id: ShowId },

    /// An episode mutation referenced an episode the cache does not hold
    #[error("Episode {episode_id} of show {show_id} is not in the cache")]
    EpisodeNotCached {
        show_id: ShowId,
        episode_id: EpisodeId,
    },
}
