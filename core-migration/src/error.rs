use crate::outcome::{ArtistCheckOutcome, PlaylistMigrationOutcome};
use core_matching::MatchingError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrationError {
    /// The destination session is no longer valid. Fatal for the whole run.
    #[error("Destination authentication failed: {0}")]
    Authentication(String),

    /// Cancellation was observed at a safe boundary. Carries everything that
    /// finished before it.
    #[error(
        "Migration cancelled after {} playlists and {} artists",
        .outcomes.len(),
        .artists.len()
    )]
    Cancelled {
        outcomes: Vec<PlaylistMigrationOutcome>,
        artists: Vec<ArtistCheckOutcome>,
    },

    #[error("Invalid playlist phase: {0}")]
    InvalidPlaylistPhase(String),

    #[error("Invalid state transition from {from} to {to}: {reason}")]
    InvalidStateTransition {
        from: String,
        to: String,
        reason: String,
    },

    /// Rejected orchestrator configuration
    #[error(transparent)]
    Config(#[from] core_runtime::Error),
}

impl From<MatchingError> for MigrationError {
    fn from(error: MatchingError) -> Self {
        match error {
            MatchingError::Authentication(message) => MigrationError::Authentication(message),
        }
    }
}

impl MigrationError {
    /// True for failures that end a run before every playlist was handled.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, MigrationError::Cancelled { .. })
    }
}

pub type Result<T> = std::result::Result<T, MigrationError>;
