//! # Source Library Module
//!
//! In-memory model of the library being migrated away from.
//!
//! ## Overview
//!
//! This module owns:
//! - Source tracks, artists and playlists as collected from the source catalog
//! - The [`CatalogSnapshot`] that a migration run reads once and never mutates
//! - Deterministic merging of artist lists collected from several origins
//!   (followed artists, top artists per listening window)
//!
//! Collection and persistence of snapshots are host concerns; every model
//! derives `serde` traits so hosts can store them however they like.

pub mod error;
pub mod merge;
pub mod models;

pub use error::{LibraryError, Result};
pub use merge::{merge_artists, ArtistMerger, ArtistOrigin, TopRange};
pub use models::{Artist, CatalogSnapshot, Playlist, Track};
