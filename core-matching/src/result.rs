//! Match outcomes
//!
//! A lookup either finds exactly one destination entity or nothing. `Found`
//! always names the strategy that accepted it so consumers can separate
//! verified matches from best-effort guesses.

use bridge_traits::catalog::{ArtistCandidate, TrackCandidate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a candidate was accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Recording code matched exactly
    ExactCode,
    /// Title and artist overlapped after case folding
    FuzzyNameArtist,
    /// Nothing verified; the destination's top-ranked hit was taken as-is
    FirstCandidateFallback,
}

impl MatchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStrategy::ExactCode => "exact_code",
            MatchStrategy::FuzzyNameArtist => "fuzzy_name_artist",
            MatchStrategy::FirstCandidateFallback => "first_candidate_fallback",
        }
    }

    /// True when the match was checked against source metadata.
    pub fn is_verified(&self) -> bool {
        !matches!(self, MatchStrategy::FirstCandidateFallback)
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The destination entity a lookup resolved to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedEntity {
    /// Never empty
    pub destination_id: String,
    pub destination_name: String,
    /// Primary artist for tracks; absent for artist lookups
    pub destination_artist: Option<String>,
    pub destination_album: Option<String>,
    pub strategy: MatchStrategy,
}

/// Result of a single lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchResult {
    NotFound {
        /// Diagnostic text when the lookup failed rather than came back empty
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Found(MatchedEntity),
}

impl MatchResult {
    pub fn not_found() -> Self {
        MatchResult::NotFound { error: None }
    }

    pub fn not_found_with_error(error: impl Into<String>) -> Self {
        MatchResult::NotFound {
            error: Some(error.into()),
        }
    }

    /// Accept a track candidate. A candidate without an id yields `NotFound`.
    pub fn from_track_candidate(candidate: TrackCandidate, strategy: MatchStrategy) -> Self {
        if candidate.id.trim().is_empty() {
            return Self::not_found();
        }
        MatchResult::Found(MatchedEntity {
            destination_id: candidate.id,
            destination_name: candidate.name,
            destination_artist: Some(candidate.artist_name),
            destination_album: candidate.album_name,
            strategy,
        })
    }

    /// Accept an artist candidate. A candidate without an id yields `NotFound`.
    pub fn from_artist_candidate(candidate: ArtistCandidate, strategy: MatchStrategy) -> Self {
        if candidate.id.trim().is_empty() {
            return Self::not_found();
        }
        MatchResult::Found(MatchedEntity {
            destination_id: candidate.id,
            destination_name: candidate.name,
            destination_artist: None,
            destination_album: None,
            strategy,
        })
    }

    pub fn is_found(&self) -> bool {
        matches!(self, MatchResult::Found(_))
    }

    pub fn as_found(&self) -> Option<&MatchedEntity> {
        match self {
            MatchResult::Found(entity) => Some(entity),
            MatchResult::NotFound { .. } => None,
        }
    }

    pub fn destination_id(&self) -> Option<&str> {
        self.as_found().map(|entity| entity.destination_id.as_str())
    }

    pub fn strategy(&self) -> Option<MatchStrategy> {
        self.as_found().map(|entity| entity.strategy)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            MatchResult::NotFound { error } => error.as_deref(),
            MatchResult::Found(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_id_never_found() {
        let result = MatchResult::from_track_candidate(
            TrackCandidate::new("  ", "Song", "Artist"),
            MatchStrategy::ExactCode,
        );
        assert_eq!(result, MatchResult::not_found());

        let result = MatchResult::from_artist_candidate(
            ArtistCandidate::new("", "Artist"),
            MatchStrategy::FirstCandidateFallback,
        );
        assert!(!result.is_found());
    }

    #[test]
    fn test_found_accessors() {
        let result = MatchResult::from_track_candidate(
            TrackCandidate::new("42", "Song", "Artist").with_album("LP"),
            MatchStrategy::FuzzyNameArtist,
        );

        assert_eq!(result.destination_id(), Some("42"));
        assert_eq!(result.strategy(), Some(MatchStrategy::FuzzyNameArtist));
        assert_eq!(result.error(), None);
        let entity = result.as_found().unwrap();
        assert_eq!(entity.destination_artist.as_deref(), Some("Artist"));
        assert_eq!(entity.destination_album.as_deref(), Some("LP"));
    }

    #[test]
    fn test_serialized_shape() {
        let missing = MatchResult::not_found_with_error("timeout");
        let json = serde_json::to_value(&missing).unwrap();
        assert_eq!(json["status"], "not_found");
        assert_eq!(json["error"], "timeout");

        let plain = serde_json::to_value(MatchResult::not_found()).unwrap();
        assert!(plain.get("error").is_none());

        let found = MatchResult::from_artist_candidate(
            ArtistCandidate::new("a-1", "Sade"),
            MatchStrategy::FirstCandidateFallback,
        );
        let json = serde_json::to_value(&found).unwrap();
        assert_eq!(json["status"], "found");
        assert_eq!(json["strategy"], "first_candidate_fallback");

        let back: MatchResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, found);
    }

    #[test]
    fn test_strategy_verification() {
        assert!(MatchStrategy::ExactCode.is_verified());
        assert!(MatchStrategy::FuzzyNameArtist.is_verified());
        assert!(!MatchStrategy::FirstCandidateFallback.is_verified());
    }
}
