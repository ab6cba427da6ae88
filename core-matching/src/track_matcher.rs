//! Track resolution ladder
//!
//! ## Strategies
//!
//! 1. **Exact code**: when the source track carries an ISRC, search the
//!    destination by code and accept the first candidate whose own code is
//!    identical. Authoritative; nothing else is compared.
//! 2. **Fuzzy name/artist**: search by `"<first two artists> <title>"` and
//!    accept the first candidate where the titles contain one another and at
//!    least one source artist overlaps the candidate's primary artist. All
//!    comparisons are case-folded.
//! 3. **First candidate**: if the fuzzy search returned anything but nothing
//!    overlapped, take the destination's top hit. Flagged with
//!    [`MatchStrategy::FirstCandidateFallback`].
//!
//! Candidate order is the destination's relevance ranking and is never
//! re-sorted, so the same responses always produce the same match.

use crate::error::{MatchingError, Result};
use crate::result::{MatchResult, MatchStrategy};
use bridge_traits::catalog::{DestinationCatalog, TrackCandidate};
use core_library::Track;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Candidates fetched for an exact-code lookup
pub const EXACT_CODE_CANDIDATE_LIMIT: usize = 5;

/// Candidates fetched for a free-text lookup
pub const FUZZY_CANDIDATE_LIMIT: usize = 10;

/// Source artists included in the free-text query
pub const FUZZY_QUERY_ARTIST_LIMIT: usize = 2;

/// Resolves source tracks against the destination catalog.
pub struct TrackMatcher {
    catalog: Arc<dyn DestinationCatalog>,
}

impl TrackMatcher {
    pub fn new(catalog: Arc<dyn DestinationCatalog>) -> Self {
        Self { catalog }
    }

    /// Resolve one track.
    ///
    /// # Errors
    ///
    /// Returns [`MatchingError::Authentication`] if the destination rejects
    /// the session. Every other failure is reported as `NotFound`.
    #[instrument(skip(self, track), fields(track = %track.display_name()))]
    pub async fn match_track(&self, track: &Track) -> Result<MatchResult> {
        if let Some(isrc) = track.isrc() {
            if let Some(result) = self.match_by_code(isrc).await? {
                return Ok(result);
            }
        }

        self.match_by_name_and_artist(track).await
    }

    async fn match_by_code(&self, isrc: &str) -> Result<Option<MatchResult>> {
        let candidates = match self
            .catalog
            .search_tracks_by_code(isrc, EXACT_CODE_CANDIDATE_LIMIT)
            .await
        {
            Ok(candidates) => candidates,
            Err(e) => {
                if let Some(fatal) = MatchingError::escalate(&e) {
                    return Err(fatal);
                }
                debug!(isrc, error = %e, "Exact-code search failed, falling back to text search");
                return Ok(None);
            }
        };

        let matched = candidates
            .into_iter()
            .filter(|candidate| !candidate.id.trim().is_empty())
            .find(|candidate| candidate.isrc.as_deref() == Some(isrc));

        Ok(matched.map(|candidate| {
            debug!(isrc, destination_id = %candidate.id, "Exact-code match");
            MatchResult::from_track_candidate(candidate, MatchStrategy::ExactCode)
        }))
    }

    async fn match_by_name_and_artist(&self, track: &Track) -> Result<MatchResult> {
        let query = fuzzy_query(track);

        let candidates: Vec<TrackCandidate> = match self
            .catalog
            .search_tracks(&query, FUZZY_CANDIDATE_LIMIT)
            .await
        {
            Ok(candidates) => candidates
                .into_iter()
                .filter(|candidate| !candidate.id.trim().is_empty())
                .collect(),
            Err(e) => {
                if let Some(fatal) = MatchingError::escalate(&e) {
                    return Err(fatal);
                }
                warn!(query = %query, error = %e, "Track search failed");
                return Ok(MatchResult::not_found_with_error(e.to_string()));
            }
        };

        let overlapping = candidates.iter().position(|candidate| {
            names_overlap(&track.name, &candidate.name)
                && track
                    .artists
                    .iter()
                    .any(|artist| names_overlap(artist, &candidate.artist_name))
        });

        let mut candidates = candidates;
        match overlapping {
            Some(index) => {
                let candidate = candidates.swap_remove(index);
                debug!(destination_id = %candidate.id, "Name/artist match");
                Ok(MatchResult::from_track_candidate(
                    candidate,
                    MatchStrategy::FuzzyNameArtist,
                ))
            }
            None if !candidates.is_empty() => {
                let candidate = candidates.swap_remove(0);
                debug!(destination_id = %candidate.id, "No overlap, taking first candidate");
                Ok(MatchResult::from_track_candidate(
                    candidate,
                    MatchStrategy::FirstCandidateFallback,
                ))
            }
            None => {
                debug!(query = %query, "No candidates");
                Ok(MatchResult::not_found())
            }
        }
    }
}

/// `"Artist A, Artist B Title"`
fn fuzzy_query(track: &Track) -> String {
    let artists: Vec<&str> = track
        .artists
        .iter()
        .take(FUZZY_QUERY_ARTIST_LIMIT)
        .map(String::as_str)
        .collect();

    if artists.is_empty() {
        track.name.clone()
    } else {
        format!("{} {}", artists.join(", "), track.name)
    }
}

fn fold(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Either side contains the other after case folding. Empty never overlaps.
fn names_overlap(source: &str, candidate: &str) -> bool {
    let source = fold(source);
    let candidate = fold(candidate);
    if source.is_empty() || candidate.is_empty() {
        return false;
    }
    source.contains(&candidate) || candidate.contains(&source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockCatalog;
    use bridge_traits::error::BridgeError;

    fn track(name: &str, artists: &[&str]) -> Track {
        Track::new(
            name,
            artists.iter().map(|a| a.to_string()).collect(),
            format!("src-{}", name),
        )
    }

    #[test]
    fn test_fuzzy_query_uses_first_two_artists() {
        let t = track("Song", &["A", "B", "C"]);
        assert_eq!(fuzzy_query(&t), "A, B Song");
    }

    #[test]
    fn test_names_overlap() {
        assert!(names_overlap("Song", "Song (Remix)"));
        assert!(names_overlap("SONG (remix)", "song"));
        assert!(names_overlap("  Daft Punk ", "daft punk"));
        assert!(!names_overlap("Song", "Other"));
        assert!(!names_overlap("", "Song"));
        assert!(!names_overlap("Song", "   "));
    }

    #[tokio::test]
    async fn test_exact_code_wins_over_divergent_text() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_search_tracks_by_code()
            .times(1)
            .returning(|isrc, limit| {
                assert_eq!(isrc, "USRC17607839");
                assert_eq!(limit, EXACT_CODE_CANDIDATE_LIMIT);
                Ok(vec![
                    TrackCandidate::new("wrong", "Other", "X").with_isrc("GBAYE0000001"),
                    TrackCandidate::new("t-1", "Completely Different", "Nobody")
                        .with_isrc("USRC17607839"),
                ])
            });
        catalog.expect_search_tracks().times(0);

        let matcher = TrackMatcher::new(Arc::new(catalog));
        let t = track("Song", &["Artist"]).with_isrc("USRC17607839");
        let result = matcher.match_track(&t).await.unwrap();

        assert_eq!(result.destination_id(), Some("t-1"));
        assert_eq!(result.strategy(), Some(MatchStrategy::ExactCode));
    }

    #[tokio::test]
    async fn test_code_mismatch_falls_through_to_fuzzy() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_search_tracks_by_code()
            .times(1)
            .returning(|_, _| Ok(vec![TrackCandidate::new("t-9", "Song", "Artist").with_isrc("OTHER")]));
        catalog
            .expect_search_tracks()
            .times(1)
            .returning(|_, _| Ok(vec![TrackCandidate::new("t-2", "song", "ARTIST")]));

        let matcher = TrackMatcher::new(Arc::new(catalog));
        let t = track("Song", &["Artist"]).with_isrc("USRC17607839");
        let result = matcher.match_track(&t).await.unwrap();

        assert_eq!(result.destination_id(), Some("t-2"));
        assert_eq!(result.strategy(), Some(MatchStrategy::FuzzyNameArtist));
    }

    #[tokio::test]
    async fn test_fuzzy_match_with_remix_title() {
        let mut catalog = MockCatalog::new();
        catalog.expect_search_tracks_by_code().times(0);
        catalog
            .expect_search_tracks()
            .times(1)
            .returning(|query, limit| {
                assert_eq!(query, "Artist Song");
                assert_eq!(limit, FUZZY_CANDIDATE_LIMIT);
                Ok(vec![
                    TrackCandidate::new("t-x", "Unrelated", "Artist"),
                    TrackCandidate::new("t-2", "Song (Remix)", "Artist").with_album("Remixes"),
                ])
            });

        let matcher = TrackMatcher::new(Arc::new(catalog));
        let result = matcher.match_track(&track("Song", &["Artist"])).await.unwrap();

        let entity = result.as_found().unwrap();
        assert_eq!(entity.destination_id, "t-2");
        assert_eq!(entity.strategy, MatchStrategy::FuzzyNameArtist);
        assert_eq!(entity.destination_album.as_deref(), Some("Remixes"));
    }

    #[tokio::test]
    async fn test_second_artist_can_satisfy_overlap() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_search_tracks()
            .returning(|_, _| Ok(vec![TrackCandidate::new("t-3", "Duet", "Guest")]));

        let matcher = TrackMatcher::new(Arc::new(catalog));
        let result = matcher
            .match_track(&track("Duet", &["Lead", "guest"]))
            .await
            .unwrap();

        assert_eq!(result.strategy(), Some(MatchStrategy::FuzzyNameArtist));
    }

    #[tokio::test]
    async fn test_first_candidate_fallback() {
        let mut catalog = MockCatalog::new();
        catalog.expect_search_tracks().returning(|_, _| {
            Ok(vec![
                TrackCandidate::new("first", "Nothing Alike", "Someone"),
                TrackCandidate::new("second", "Also Different", "Else"),
            ])
        });

        let matcher = TrackMatcher::new(Arc::new(catalog));
        let result = matcher.match_track(&track("Song", &["Artist"])).await.unwrap();

        assert_eq!(result.destination_id(), Some("first"));
        assert_eq!(result.strategy(), Some(MatchStrategy::FirstCandidateFallback));
    }

    #[tokio::test]
    async fn test_no_candidates_is_not_found() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_search_tracks_by_code()
            .returning(|_, _| Ok(Vec::new()));
        catalog.expect_search_tracks().returning(|_, _| Ok(Vec::new()));

        let matcher = TrackMatcher::new(Arc::new(catalog));
        let t = track("Song", &["Artist"]).with_isrc("USRC17607839");
        let result = matcher.match_track(&t).await.unwrap();

        assert_eq!(result, MatchResult::not_found());
    }

    #[tokio::test]
    async fn test_candidates_without_id_are_ignored() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_search_tracks()
            .returning(|_, _| Ok(vec![TrackCandidate::new("", "Song", "Artist")]));

        let matcher = TrackMatcher::new(Arc::new(catalog));
        let result = matcher.match_track(&track("Song", &["Artist"])).await.unwrap();

        assert!(!result.is_found());
    }

    #[tokio::test]
    async fn test_transient_errors_become_not_found() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_search_tracks_by_code()
            .returning(|_, _| Err(BridgeError::Transient("timeout".to_string())));
        catalog
            .expect_search_tracks()
            .returning(|_, _| Err(BridgeError::Transient("429".to_string())));

        let matcher = TrackMatcher::new(Arc::new(catalog));
        let t = track("Song", &["Artist"]).with_isrc("USRC17607839");
        let result = matcher.match_track(&t).await.unwrap();

        assert!(!result.is_found());
        assert!(result.error().unwrap().contains("429"));
    }

    #[tokio::test]
    async fn test_code_search_error_falls_through_to_fuzzy() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_search_tracks_by_code()
            .times(1)
            .returning(|_, _| Err(BridgeError::Transient("timeout".to_string())));
        catalog
            .expect_search_tracks()
            .times(1)
            .returning(|_, _| Ok(vec![TrackCandidate::new("t-4", "Song (Live)", "Artist")]));

        let matcher = TrackMatcher::new(Arc::new(catalog));
        let t = track("Song", &["Artist"]).with_isrc("USRC17607839");
        let result = matcher.match_track(&t).await.unwrap();

        assert_eq!(result.destination_id(), Some("t-4"));
        assert_eq!(result.strategy(), Some(MatchStrategy::FuzzyNameArtist));
        assert_eq!(result.error(), None);
    }

    #[tokio::test]
    async fn test_padded_candidate_code_is_not_exact() {
        let mut catalog = MockCatalog::new();
        catalog.expect_search_tracks_by_code().times(1).returning(|_, _| {
            Ok(vec![
                TrackCandidate::new("t-pad", "Song", "Artist").with_isrc(" USRC17607839 ")
            ])
        });
        catalog
            .expect_search_tracks()
            .times(1)
            .returning(|_, _| Ok(vec![TrackCandidate::new("t-5", "Song", "Artist")]));

        let matcher = TrackMatcher::new(Arc::new(catalog));
        let t = track("Song", &["Artist"]).with_isrc("USRC17607839");
        let result = matcher.match_track(&t).await.unwrap();

        assert_eq!(result.destination_id(), Some("t-5"));
        assert_eq!(result.strategy(), Some(MatchStrategy::FuzzyNameArtist));
    }

    #[tokio::test]
    async fn test_authentication_failure_propagates() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_search_tracks_by_code()
            .returning(|_, _| Err(BridgeError::Unauthorized("expired".to_string())));
        catalog.expect_search_tracks().times(0);

        let matcher = TrackMatcher::new(Arc::new(catalog));
        let t = track("Song", &["Artist"]).with_isrc("USRC17607839");
        let err = matcher.match_track(&t).await.unwrap_err();

        assert!(matches!(err, MatchingError::Authentication(_)));
    }
}
