//! # Migration Module
//!
//! Recreates a source catalog snapshot in the destination catalog.
//!
//! ## Overview
//!
//! A run works through the snapshot in order:
//! - Matching every track of every playlist against the destination
//! - Creating each destination playlist and adding its found tracks in batches
//! - Checking which followed artists exist in the destination
//! - Summarising match rates for the report renderer
//!
//! ## Components
//!
//! - **Playlist State Machine** (`state`): Validated per-playlist phase transitions
//! - **Outcomes** (`outcome`): Per-playlist and per-artist results
//! - **Aggregator** (`aggregator`): Run-level totals and rates
//! - **Orchestrator** (`orchestrator`): Drives the run, throttling, events and cancellation

pub mod aggregator;
pub mod error;
pub mod orchestrator;
pub mod outcome;
pub mod state;

pub use aggregator::{ArtistSummary, MigrationSummary, ResultAggregator};
pub use error::{MigrationError, Result};
pub use orchestrator::{MigrationOrchestrator, MigrationReport};
pub use outcome::{
    ArtistCheckOutcome, DestinationPlaylist, NotFoundPreview, PlaylistMigrationOutcome,
    SourcePlaylistRef, TrackMatch, NOT_FOUND_PREVIEW_LIMIT,
};
pub use state::{
    MigrationProgress, MigrationRunId, PlaylistCompletion, PlaylistMigration, PlaylistPhase,
};
