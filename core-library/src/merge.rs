//! Artist list merging
//!
//! The source catalog exposes artists through several lists: the ones a user
//! follows and the ones they listen to most over three windows. A single
//! artist usually appears in more than one of them. Merging keys on
//! `source_id`: the first record seen supplies every scalar field, and later
//! records only contribute their origin tags. Output order is first-seen
//! order, so the same inputs always produce the same list.

use crate::models::Artist;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Listening window of a "top artists" list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopRange {
    ShortTerm,
    MediumTerm,
    LongTerm,
}

impl TopRange {
    pub const ALL: [TopRange; 3] = [TopRange::ShortTerm, TopRange::MediumTerm, TopRange::LongTerm];
}

/// Which collection list an artist record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtistOrigin {
    Followed,
    Top(TopRange),
}

impl ArtistOrigin {
    /// Stable tag stored in [`Artist::source_tags`]
    pub fn as_tag(&self) -> &'static str {
        match self {
            ArtistOrigin::Followed => "followed",
            ArtistOrigin::Top(TopRange::ShortTerm) => "top-listened-short-term",
            ArtistOrigin::Top(TopRange::MediumTerm) => "top-listened-medium-term",
            ArtistOrigin::Top(TopRange::LongTerm) => "top-listened-long-term",
        }
    }
}

impl fmt::Display for ArtistOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Incremental artist merger.
///
/// ```
/// use core_library::{Artist, ArtistMerger, ArtistOrigin, TopRange};
///
/// let mut merger = ArtistMerger::new();
/// merger.add(ArtistOrigin::Followed, vec![Artist::new("Portishead", "p-1")]);
/// merger.add(
///     ArtistOrigin::Top(TopRange::ShortTerm),
///     vec![Artist::new("Portishead", "p-1"), Artist::new("Tricky", "t-1")],
/// );
///
/// let artists = merger.finish();
/// assert_eq!(artists.len(), 2);
/// assert_eq!(artists[0].source_tags.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct ArtistMerger {
    merged: Vec<Artist>,
    index: HashMap<String, usize>,
}

impl ArtistMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a list of artists that all came from `origin`.
    pub fn add<I>(&mut self, origin: ArtistOrigin, artists: I)
    where
        I: IntoIterator<Item = Artist>,
    {
        for artist in artists {
            self.insert(artist.with_source_tag(origin.as_tag()));
        }
    }

    /// Add one record, keeping whatever tags it already carries.
    pub fn insert(&mut self, artist: Artist) {
        match self.index.get(&artist.source_id) {
            Some(&position) => {
                self.merged[position].source_tags.extend(artist.source_tags);
            }
            None => {
                self.index.insert(artist.source_id.clone(), self.merged.len());
                self.merged.push(artist);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.merged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.merged.is_empty()
    }

    pub fn finish(self) -> Vec<Artist> {
        self.merged
    }
}

/// Merge already-tagged artist records by `source_id`.
pub fn merge_artists<I>(records: I) -> Vec<Artist>
where
    I: IntoIterator<Item = Artist>,
{
    let mut merger = ArtistMerger::new();
    for artist in records {
        merger.insert(artist);
    }
    merger.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_tags() {
        assert_eq!(ArtistOrigin::Followed.as_tag(), "followed");
        assert_eq!(
            ArtistOrigin::Top(TopRange::LongTerm).to_string(),
            "top-listened-long-term"
        );
    }

    #[test]
    fn test_first_seen_scalars_win() {
        let first = Artist::new("Air", "air-1")
            .with_popularity(60)
            .with_follower_count(1_000)
            .with_source_tag("followed");
        let later = Artist::new("AIR (French band)", "air-1")
            .with_popularity(90)
            .with_follower_count(5)
            .with_source_tag("top-listened-short-term");

        let merged = merge_artists(vec![first, later]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "Air");
        assert_eq!(merged[0].popularity, 60);
        assert_eq!(merged[0].follower_count, 1_000);
        assert_eq!(
            merged[0].source_tags.iter().cloned().collect::<Vec<_>>(),
            vec!["followed", "top-listened-short-term"]
        );
    }

    #[test]
    fn test_merge_preserves_first_seen_order() {
        let mut merger = ArtistMerger::new();
        merger.add(
            ArtistOrigin::Top(TopRange::MediumTerm),
            vec![Artist::new("B", "b"), Artist::new("A", "a")],
        );
        merger.add(
            ArtistOrigin::Followed,
            vec![Artist::new("C", "c"), Artist::new("B", "b")],
        );

        let ids: Vec<_> = merger.finish().into_iter().map(|a| a.source_id).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_repeated_origin_is_not_duplicated() {
        let mut merger = ArtistMerger::new();
        for range in TopRange::ALL {
            merger.add(ArtistOrigin::Top(range), vec![Artist::new("Moby", "moby")]);
        }
        merger.add(ArtistOrigin::Top(TopRange::ShortTerm), vec![Artist::new("Moby", "moby")]);

        let merged = merger.finish();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].source_tags.len(), 3);
    }

    #[test]
    fn test_empty_merge() {
        let merger = ArtistMerger::new();
        assert!(merger.is_empty());
        assert!(merge_artists(Vec::new()).is_empty());
    }
}
