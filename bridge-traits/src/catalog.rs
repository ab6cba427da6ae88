//! Destination Catalog Abstraction
//!
//! The catalog that a library is migrated *to*. Hosts wrap the destination
//! service's authenticated API behind this trait; the core never sees HTTP,
//! pagination or session handling.
//!
//! ## Contract
//!
//! - Searches return candidates in the destination's own relevance order.
//!   The core relies on that order as its tie-break and never re-ranks.
//! - `add_items` accepts at most [`MAX_ITEMS_PER_ADD`] ids per call.
//! - Failures must be classified through [`BridgeError`](crate::error::BridgeError):
//!   `Transient` for network/timeout/throttling, `Unauthorized` for dead sessions.
//!
//! ## Example
//!
//! ```ignore
//! use bridge_traits::catalog::{DestinationCatalog, TrackCandidate, ArtistCandidate};
//! use bridge_traits::error::Result;
//! use async_trait::async_trait;
//!
//! struct TidalCatalog { session: TidalSession }
//!
//! #[async_trait]
//! impl DestinationCatalog for TidalCatalog {
//!     async fn search_tracks_by_code(&self, isrc: &str, limit: usize) -> Result<Vec<TrackCandidate>> {
//!         // ...
//!     }
//!
//!     fn playlist_url(&self, playlist_id: &str) -> Option<String> {
//!         Some(format!("https://listen.tidal.com/playlist/{}", playlist_id))
//!     }
//!     // ...
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Per-call item ceiling imposed by the destination playlist API.
pub const MAX_ITEMS_PER_ADD: usize = 100;

/// A track returned by a destination search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackCandidate {
    /// Destination track identifier
    pub id: String,
    /// Track title as the destination spells it
    pub name: String,
    /// Primary artist name
    pub artist_name: String,
    /// Album title, when the destination exposes one
    pub album_name: Option<String>,
    /// International Standard Recording Code, when known
    pub isrc: Option<String>,
}

impl TrackCandidate {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        artist_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            artist_name: artist_name.into(),
            album_name: None,
            isrc: None,
        }
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album_name = Some(album.into());
        self
    }

    pub fn with_isrc(mut self, isrc: impl Into<String>) -> Self {
        self.isrc = Some(isrc.into());
        self
    }
}

/// An artist returned by a destination search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistCandidate {
    pub id: String,
    pub name: String,
}

impl ArtistCandidate {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Search and playlist-writing capabilities of the destination catalog.
///
/// Implementations must be safe to share across tasks; the core holds them
/// as `Arc<dyn DestinationCatalog>`.
#[async_trait]
pub trait DestinationCatalog: Send + Sync {
    /// Search tracks by International Standard Recording Code.
    ///
    /// Returns up to `limit` candidates. Candidates are not guaranteed to carry
    /// the queried code; callers verify it.
    async fn search_tracks_by_code(&self, isrc: &str, limit: usize) -> Result<Vec<TrackCandidate>>;

    /// Free-text track search, ranked by the destination.
    async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<TrackCandidate>>;

    /// Free-text artist search, ranked by the destination.
    async fn search_artists(&self, name: &str, limit: usize) -> Result<Vec<ArtistCandidate>>;

    /// Create an empty playlist owned by the signed-in user.
    ///
    /// Returns the destination playlist identifier.
    async fn create_playlist(&self, name: &str, description: &str) -> Result<String>;

    /// Append tracks to a playlist, preserving the given order.
    ///
    /// `track_ids.len()` never exceeds [`MAX_ITEMS_PER_ADD`].
    async fn add_items(&self, playlist_id: &str, track_ids: &[String]) -> Result<()>;

    /// Public web link for a destination playlist, if the host knows how to build one.
    fn playlist_url(&self, _playlist_id: &str) -> Option<String> {
        None
    }

    /// Public web link for a destination artist, if the host knows how to build one.
    fn artist_url(&self, _artist_id: &str) -> Option<String> {
        None
    }
}
