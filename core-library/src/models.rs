//! Domain models for the source library
//!
//! All models are plain data: they are built once by the collection step and
//! treated as read-only for the rest of a migration run.

use crate::error::{LibraryError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

// =============================================================================
// Track
// =============================================================================

/// A track as described by the source catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Track title
    pub name: String,
    /// Credited artists, in credit order
    pub artists: Vec<String>,
    /// Album title
    #[serde(default)]
    pub album: Option<String>,
    /// Source catalog identifier
    pub source_id: String,
    /// International Standard Recording Code
    #[serde(default)]
    pub isrc: Option<String>,
    /// Duration in milliseconds
    #[serde(default)]
    pub duration_ms: u64,
}

impl Track {
    pub fn new(name: impl Into<String>, artists: Vec<String>, source_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            artists,
            album: None,
            source_id: source_id.into(),
            isrc: None,
            duration_ms: 0,
        }
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn with_isrc(mut self, isrc: impl Into<String>) -> Self {
        self.isrc = Some(isrc.into());
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// The recording code, if present and non-blank
    pub fn isrc(&self) -> Option<&str> {
        self.isrc
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }

    /// Human-readable "Artist A, Artist B - Title"
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.artists.join(", "), self.name)
    }

    /// Validate track data
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Track name cannot be empty".to_string());
        }

        if self.artists.is_empty() {
            return Err(format!("Track '{}' has no artists", self.name));
        }

        if self.artists.iter().any(|artist| artist.trim().is_empty()) {
            return Err(format!("Track '{}' has a blank artist name", self.name));
        }

        Ok(())
    }
}

// =============================================================================
// Artist
// =============================================================================

/// An artist record from the source catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
    pub source_id: String,
    #[serde(default)]
    pub genres: BTreeSet<String>,
    /// Source popularity score, 0 to 100
    #[serde(default)]
    pub popularity: u8,
    #[serde(default)]
    pub follower_count: u64,
    /// Which collection lists contributed this record
    #[serde(default)]
    pub source_tags: BTreeSet<String>,
    /// Link to the artist page in the source catalog
    #[serde(default)]
    pub source_url: Option<String>,
}

impl Artist {
    pub fn new(name: impl Into<String>, source_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_id: source_id.into(),
            genres: BTreeSet::new(),
            popularity: 0,
            follower_count: 0,
            source_tags: BTreeSet::new(),
            source_url: None,
        }
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_popularity(mut self, popularity: u8) -> Self {
        self.popularity = popularity;
        self
    }

    pub fn with_follower_count(mut self, follower_count: u64) -> Self {
        self.follower_count = follower_count;
        self
    }

    pub fn with_source_tag(mut self, tag: impl Into<String>) -> Self {
        self.source_tags.insert(tag.into());
        self
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    /// Validate artist data
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Artist name cannot be empty".to_string());
        }

        if self.source_id.trim().is_empty() {
            return Err(format!("Artist '{}' has no source id", self.name));
        }

        if self.popularity > 100 {
            return Err(format!(
                "Artist popularity {} is out of valid range",
                self.popularity
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Playlist
// =============================================================================

/// A playlist with its ordered track list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub source_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub is_collaborative: bool,
    /// Link to the playlist in the source catalog
    #[serde(default)]
    pub source_url: Option<String>,
    pub tracks: Vec<Track>,
}

impl Playlist {
    pub fn new(source_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            name: name.into(),
            description: String::new(),
            is_public: false,
            is_collaborative: false,
            source_url: None,
            tracks: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_visibility(mut self, is_public: bool, is_collaborative: bool) -> Self {
        self.is_public = is_public;
        self.is_collaborative = is_collaborative;
        self
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    pub fn with_tracks(mut self, tracks: Vec<Track>) -> Self {
        self.tracks = tracks;
        self
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Validate playlist data, including every track
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Playlist name cannot be empty".to_string());
        }

        for (position, track) in self.tracks.iter().enumerate() {
            track
                .validate()
                .map_err(|e| format!("Track #{} in '{}': {}", position + 1, self.name, e))?;
        }

        Ok(())
    }
}

// =============================================================================
// Catalog Snapshot
// =============================================================================

/// Everything collected from the source catalog for one migration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub playlists: Vec<Playlist>,
    #[serde(default)]
    pub artists: Vec<Artist>,
    /// When the collection step finished
    #[serde(default)]
    pub collected_at: Option<DateTime<Utc>>,
}

impl CatalogSnapshot {
    pub fn new(playlists: Vec<Playlist>, artists: Vec<Artist>) -> Self {
        Self {
            playlists,
            artists,
            collected_at: None,
        }
    }

    pub fn with_collected_at(mut self, at: DateTime<Utc>) -> Self {
        self.collected_at = Some(at);
        self
    }

    pub fn total_tracks(&self) -> usize {
        self.playlists.iter().map(Playlist::track_count).sum()
    }

    /// Reject the snapshot on the first invalid playlist, track or artist.
    pub fn validate(&self) -> Result<()> {
        for playlist in &self.playlists {
            playlist
                .validate()
                .map_err(|message| LibraryError::InvalidInput {
                    field: format!("playlist:{}", playlist.source_id),
                    message,
                })?;
        }

        for artist in &self.artists {
            artist.validate().map_err(|message| LibraryError::InvalidInput {
                field: format!("artist:{}", artist.source_id),
                message,
            })?;
        }

        Ok(())
    }

    /// Copy of this snapshot without tracks that cannot be matched.
    ///
    /// Local files and tracks removed from the source catalog come through
    /// collection without a title or artist credit. They are dropped here so a
    /// run never wastes destination calls on them.
    pub fn sanitized(&self) -> Self {
        let playlists = self
            .playlists
            .iter()
            .map(|playlist| {
                let tracks = playlist
                    .tracks
                    .iter()
                    .filter(|track| match track.validate() {
                        Ok(()) => true,
                        Err(reason) => {
                            warn!(
                                playlist = %playlist.name,
                                source_id = %track.source_id,
                                reason = %reason,
                                "Dropping unmatchable track"
                            );
                            false
                        }
                    })
                    .cloned()
                    .collect();
                Playlist {
                    tracks,
                    ..playlist.clone()
                }
            })
            .collect();

        Self {
            playlists,
            artists: self.artists.clone(),
            collected_at: self.collected_at,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn track(name: &str, artists: &[&str]) -> Track {
        Track::new(
            name,
            artists.iter().map(|a| a.to_string()).collect(),
            format!("src-{}", name),
        )
    }

    #[test]
    fn test_track_builder() {
        let t = track("Paranoid Android", &["Radiohead"])
            .with_album("OK Computer")
            .with_isrc("GBAYE9700086")
            .with_duration_ms(387_000);

        assert_eq!(t.album.as_deref(), Some("OK Computer"));
        assert_eq!(t.isrc(), Some("GBAYE9700086"));
        assert_eq!(t.duration_ms, 387_000);
        assert_eq!(t.display_name(), "Radiohead - Paranoid Android");
    }

    #[test]
    fn test_blank_isrc_is_absent() {
        let t = track("Song", &["A"]).with_isrc("   ");
        assert_eq!(t.isrc(), None);
    }

    #[test]
    fn test_track_validation() {
        assert!(track("Song", &["A", "B"]).validate().is_ok());
        assert!(track("", &["A"]).validate().is_err());
        assert!(track("Song", &[]).validate().is_err());
        assert!(track("Song", &["A", " "]).validate().is_err());
    }

    #[test]
    fn test_artist_validation() {
        let artist = Artist::new("Massive Attack", "ma-1").with_popularity(71);
        assert!(artist.validate().is_ok());

        assert!(Artist::new("", "id").validate().is_err());
        assert!(Artist::new("Name", "").validate().is_err());
        assert!(Artist::new("Name", "id").with_popularity(101).validate().is_err());
    }

    #[test]
    fn test_playlist_validation_reports_track_position() {
        let playlist = Playlist::new("pl-1", "Mix").with_tracks(vec![
            track("Fine", &["A"]),
            track("Broken", &[]),
        ]);

        let err = playlist.validate().unwrap_err();
        assert!(err.contains("Track #2"));
    }

    #[test]
    fn test_snapshot_validate() {
        let snapshot = CatalogSnapshot::new(
            vec![Playlist::new("pl-1", "Mix").with_tracks(vec![track("Song", &["A"])])],
            vec![Artist::new("A", "a-1")],
        );
        assert!(snapshot.validate().is_ok());
        assert_eq!(snapshot.total_tracks(), 1);

        let broken = CatalogSnapshot::new(vec![Playlist::new("pl-2", "  ")], vec![]);
        match broken.validate() {
            Err(LibraryError::InvalidInput { field, .. }) => assert_eq!(field, "playlist:pl-2"),
            other => panic!("expected invalid input, got {:?}", other),
        }
    }

    #[test]
    fn test_sanitized_drops_unmatchable_tracks() {
        let snapshot = CatalogSnapshot::new(
            vec![Playlist::new("pl-1", "Mix")
                .with_description("weekend")
                .with_tracks(vec![
                    track("Keep", &["A"]),
                    track("local-file", &[]),
                    track("Also Keep", &["B"]),
                ])],
            vec![],
        );

        let clean = snapshot.sanitized();
        let names: Vec<_> = clean.playlists[0].tracks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Keep", "Also Keep"]);
        assert_eq!(clean.playlists[0].description, "weekend");
        // original untouched
        assert_eq!(snapshot.playlists[0].track_count(), 3);
    }

    #[test]
    fn test_snapshot_deserializes_with_defaults() {
        let json = r#"{
            "playlists": [{
                "source_id": "pl-1",
                "name": "Mix",
                "tracks": [{"name": "Song", "artists": ["A"], "source_id": "t-1"}]
            }]
        }"#;

        let snapshot: CatalogSnapshot = serde_json::from_str(json).unwrap();
        let t = &snapshot.playlists[0].tracks[0];
        assert_eq!(t.isrc, None);
        assert_eq!(t.duration_ms, 0);
        assert!(snapshot.artists.is_empty());
    }
}
