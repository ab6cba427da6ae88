//! Per-item migration results
//!
//! Outcomes are what the external report renderer consumes. Derived counts
//! (`tracks_found`, `tracks_total`, `match_rate`) are computed from the
//! recorded matches every time they are read, and are written out alongside
//! the raw data when an outcome is serialized.

use crate::state::PlaylistCompletion;
use core_library::{Artist, Playlist, Track};
use core_matching::MatchResult;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Unmatched tracks listed per playlist in a report
pub const NOT_FOUND_PREVIEW_LIMIT: usize = 20;

/// Identity of the playlist that was migrated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePlaylistRef {
    pub source_id: String,
    pub name: String,
    pub description: String,
    pub track_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl From<&Playlist> for SourcePlaylistRef {
    fn from(playlist: &Playlist) -> Self {
        Self {
            source_id: playlist.source_id.clone(),
            name: playlist.name.clone(),
            description: playlist.description.clone(),
            track_count: playlist.track_count(),
            source_url: playlist.source_url.clone(),
        }
    }
}

/// A source track and what it resolved to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMatch {
    pub track: Track,
    pub result: MatchResult,
}

impl TrackMatch {
    pub fn new(track: Track, result: MatchResult) -> Self {
        Self { track, result }
    }
}

/// Playlist created in the destination catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationPlaylist {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlaylistMigrationOutcome {
    pub playlist: SourcePlaylistRef,
    /// In source playlist order
    pub tracks: Vec<TrackMatch>,
    /// Present only if creation succeeded
    #[serde(default)]
    pub destination: Option<DestinationPlaylist>,
    /// Track ids accepted by the destination's batch-add
    #[serde(default)]
    pub tracks_added: usize,
    pub completion: PlaylistCompletion,
    /// Creation or batch-add error text
    #[serde(default)]
    pub failure: Option<String>,
}

/// First unmatched tracks of a playlist plus how many were left out
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotFoundPreview<'a> {
    pub tracks: Vec<&'a Track>,
    pub remaining: usize,
}

impl PlaylistMigrationOutcome {
    pub fn new(
        playlist: SourcePlaylistRef,
        tracks: Vec<TrackMatch>,
        completion: PlaylistCompletion,
    ) -> Self {
        Self {
            playlist,
            tracks,
            destination: None,
            tracks_added: 0,
            completion,
            failure: None,
        }
    }

    pub fn tracks_total(&self) -> usize {
        self.tracks.len()
    }

    pub fn tracks_found(&self) -> usize {
        self.tracks
            .iter()
            .filter(|entry| entry.result.is_found())
            .count()
    }

    /// `tracks_found / tracks_total`, or 0 for an empty playlist
    pub fn match_rate(&self) -> f64 {
        rate(self.tracks_found(), self.tracks_total())
    }

    /// Destination ids of every found track, in playlist order
    pub fn found_destination_ids(&self) -> Vec<String> {
        self.tracks
            .iter()
            .filter_map(|entry| entry.result.destination_id())
            .map(str::to_string)
            .collect()
    }

    pub fn not_found(&self) -> impl Iterator<Item = &Track> {
        self.tracks
            .iter()
            .filter(|entry| !entry.result.is_found())
            .map(|entry| &entry.track)
    }

    pub fn not_found_preview(&self, limit: usize) -> NotFoundPreview<'_> {
        let missing: Vec<&Track> = self.not_found().collect();
        let remaining = missing.len().saturating_sub(limit);
        NotFoundPreview {
            tracks: missing.into_iter().take(limit).collect(),
            remaining,
        }
    }

    pub fn is_created(&self) -> bool {
        self.destination.is_some()
    }
}

impl Serialize for PlaylistMigrationOutcome {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("PlaylistMigrationOutcome", 9)?;
        state.serialize_field("playlist", &self.playlist)?;
        state.serialize_field("tracks", &self.tracks)?;
        state.serialize_field("destination", &self.destination)?;
        state.serialize_field("tracks_found", &self.tracks_found())?;
        state.serialize_field("tracks_total", &self.tracks_total())?;
        state.serialize_field("match_rate", &self.match_rate())?;
        state.serialize_field("tracks_added", &self.tracks_added)?;
        state.serialize_field("completion", &self.completion)?;
        state.serialize_field("failure", &self.failure)?;
        state.end()
    }
}

/// Result of looking one source artist up in the destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistCheckOutcome {
    pub artist: Artist,
    pub result: MatchResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_url: Option<String>,
}

impl ArtistCheckOutcome {
    pub fn is_found(&self) -> bool {
        self.result.is_found()
    }
}

pub(crate) fn rate(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
