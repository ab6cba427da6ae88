//! Run-level statistics
//!
//! Pure folds over outcomes. Rates are never stored; they are recomputed
//! from the counts on every read and on serialization.

use crate::outcome::{rate, ArtistCheckOutcome, PlaylistMigrationOutcome};
use crate::state::PlaylistCompletion;
use core_matching::MatchStrategy;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationSummary {
    pub playlists: usize,
    pub playlists_created: usize,
    pub creation_failures: usize,
    pub partially_populated: usize,
    pub tracks_total: usize,
    pub tracks_found: usize,
    pub tracks_added: usize,
    /// Found tracks accepted without verification
    pub tracks_unverified: usize,
}

impl MigrationSummary {
    /// `tracks_found / tracks_total`, or 0 when no tracks were processed
    pub fn match_rate(&self) -> f64 {
        rate(self.tracks_found, self.tracks_total)
    }
}

impl Serialize for MigrationSummary {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("MigrationSummary", 9)?;
        state.serialize_field("playlists", &self.playlists)?;
        state.serialize_field("playlists_created", &self.playlists_created)?;
        state.serialize_field("creation_failures", &self.creation_failures)?;
        state.serialize_field("partially_populated", &self.partially_populated)?;
        state.serialize_field("tracks_total", &self.tracks_total)?;
        state.serialize_field("tracks_found", &self.tracks_found)?;
        state.serialize_field("tracks_added", &self.tracks_added)?;
        state.serialize_field("tracks_unverified", &self.tracks_unverified)?;
        state.serialize_field("match_rate", &self.match_rate())?;
        state.end()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArtistSummary {
    pub total: usize,
    pub found: usize,
}

impl ArtistSummary {
    pub fn not_found(&self) -> usize {
        self.total - self.found
    }

    pub fn found_rate(&self) -> f64 {
        rate(self.found, self.total)
    }

    pub fn not_found_rate(&self) -> f64 {
        rate(self.not_found(), self.total)
    }
}

impl Serialize for ArtistSummary {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("ArtistSummary", 5)?;
        state.serialize_field("total", &self.total)?;
        state.serialize_field("found", &self.found)?;
        state.serialize_field("not_found", &self.not_found())?;
        state.serialize_field("found_rate", &self.found_rate())?;
        state.serialize_field("not_found_rate", &self.not_found_rate())?;
        state.end()
    }
}

pub struct ResultAggregator;

impl ResultAggregator {
    pub fn aggregate(outcomes: &[PlaylistMigrationOutcome]) -> MigrationSummary {
        outcomes
            .iter()
            .fold(MigrationSummary::default(), |mut summary, outcome| {
                summary.playlists += 1;
                summary.tracks_total += outcome.tracks_total();
                summary.tracks_found += outcome.tracks_found();
                summary.tracks_added += outcome.tracks_added;
                summary.tracks_unverified += outcome
                    .tracks
                    .iter()
                    .filter(|entry| {
                        entry.result.strategy() == Some(MatchStrategy::FirstCandidateFallback)
                    })
                    .count();

                if outcome.is_created() {
                    summary.playlists_created += 1;
                }
                match outcome.completion {
                    PlaylistCompletion::CreationFailed => summary.creation_failures += 1,
                    PlaylistCompletion::PartiallyPopulated => summary.partially_populated += 1,
                    PlaylistCompletion::DryRun | PlaylistCompletion::Populated => {}
                }
                summary
            })
    }

    pub fn aggregate_artists(outcomes: &[ArtistCheckOutcome]) -> ArtistSummary {
        ArtistSummary {
            total: outcomes.len(),
            found: outcomes.iter().filter(|outcome| outcome.is_found()).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::{DestinationPlaylist, SourcePlaylistRef, TrackMatch};
    use bridge_traits::catalog::{ArtistCandidate, TrackCandidate};
    use core_library::{Artist, Track};
    use core_matching::MatchResult;

    fn outcome(
        found: &[MatchStrategy],
        missing: usize,
        completion: PlaylistCompletion,
    ) -> PlaylistMigrationOutcome {
        let mut tracks: Vec<TrackMatch> = found
            .iter()
            .enumerate()
            .map(|(i, strategy)| {
                TrackMatch::new(
                    Track::new(format!("f{}", i), vec!["A".to_string()], format!("s{}", i)),
                    MatchResult::from_track_candidate(
                        TrackCandidate::new(format!("d{}", i), "x", "A"),
                        *strategy,
                    ),
                )
            })
            .collect();
        tracks.extend((0..missing).map(|i| {
            TrackMatch::new(
                Track::new(format!("m{}", i), vec!["A".to_string()], format!("m{}", i)),
                MatchResult::not_found(),
            )
        }));

        let count = tracks.len();
        let mut outcome = PlaylistMigrationOutcome::new(
            SourcePlaylistRef {
                source_id: "pl".to_string(),
                name: "Playlist".to_string(),
                description: String::new(),
                track_count: count,
                source_url: None,
            },
            tracks,
            completion,
        );
        if matches!(
            completion,
            PlaylistCompletion::Populated | PlaylistCompletion::PartiallyPopulated
        ) {
            outcome.destination = Some(DestinationPlaylist {
                id: "dest".to_string(),
                url: None,
            });
            outcome.tracks_added = found.len();
        }
        outcome
    }

    #[test]
    fn test_aggregate_counts() {
        let outcomes = vec![
            outcome(
                &[MatchStrategy::ExactCode, MatchStrategy::FirstCandidateFallback],
                1,
                PlaylistCompletion::Populated,
            ),
            outcome(&[MatchStrategy::FuzzyNameArtist], 3, PlaylistCompletion::CreationFailed),
            outcome(&[], 0, PlaylistCompletion::PartiallyPopulated),
        ];

        let summary = ResultAggregator::aggregate(&outcomes);

        assert_eq!(summary.playlists, 3);
        assert_eq!(summary.playlists_created, 2);
        assert_eq!(summary.creation_failures, 1);
        assert_eq!(summary.partially_populated, 1);
        assert_eq!(summary.tracks_total, 7);
        assert_eq!(summary.tracks_found, 3);
        assert_eq!(summary.tracks_added, 2);
        assert_eq!(summary.tracks_unverified, 1);
        assert!((summary.match_rate() - 3.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let outcomes = vec![
            outcome(&[MatchStrategy::ExactCode], 2, PlaylistCompletion::DryRun),
            outcome(&[MatchStrategy::FuzzyNameArtist], 0, PlaylistCompletion::DryRun),
        ];

        let first = ResultAggregator::aggregate(&outcomes);
        let second = ResultAggregator::aggregate(&outcomes);

        assert_eq!(first, second);
        assert_eq!(first.match_rate(), second.match_rate());
    }

    #[test]
    fn test_empty_input_rate_is_zero() {
        let summary = ResultAggregator::aggregate(&[]);
        assert_eq!(summary, MigrationSummary::default());
        assert_eq!(summary.match_rate(), 0.0);

        let artists = ResultAggregator::aggregate_artists(&[]);
        assert_eq!(artists.found_rate(), 0.0);
        assert_eq!(artists.not_found_rate(), 0.0);
    }

    #[test]
    fn test_aggregate_artists() {
        let found = ArtistCheckOutcome {
            artist: Artist::new("Air", "air"),
            result: MatchResult::from_artist_candidate(
                ArtistCandidate::new("t-air", "Air"),
                MatchStrategy::FirstCandidateFallback,
            ),
            destination_url: None,
        };
        let missing = ArtistCheckOutcome {
            artist: Artist::new("Unknown Band", "ub"),
            result: MatchResult::not_found(),
            destination_url: None,
        };

        let summary = ResultAggregator::aggregate_artists(&[found.clone(), missing, found]);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.found, 2);
        assert_eq!(summary.not_found(), 1);
        assert!((summary.not_found_rate() - 1.0 / 3.0).abs() < 1e-9);

        let json = serde_json::to_value(summary).unwrap();
        assert_eq!(json["not_found"], 1);
    }
}
