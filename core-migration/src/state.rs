//! # Playlist Migration State Machine
//!
//! Tracks one playlist through a single, non-resumable migration pass.
//!
//! ## State Machine
//!
//! ```text
//! Pending → Searching → Creating → Populating → Done (populated / partial)
//!               │           │
//!               │           └──────────────────→ Done (creation failed)
//!               └──────────────────────────────→ Done (dry run)
//! ```
//!
//! No phase transitions backwards. A playlist interrupted by cancellation is
//! simply dropped; it never reaches `Done`.

use crate::error::{MigrationError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for a migration run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MigrationRunId(Uuid);

impl MigrationRunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for MigrationRunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MigrationRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Phase Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaylistPhase {
    /// Not started
    Pending,
    /// Tracks are being matched
    Searching,
    /// Destination playlist is being created
    Creating,
    /// Matched tracks are being added in batches
    Populating,
    /// Terminal
    Done,
}

impl PlaylistPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PlaylistPhase::Done)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlaylistPhase::Pending => "pending",
            PlaylistPhase::Searching => "searching",
            PlaylistPhase::Creating => "creating",
            PlaylistPhase::Populating => "populating",
            PlaylistPhase::Done => "done",
        }
    }
}

impl FromStr for PlaylistPhase {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(PlaylistPhase::Pending),
            "searching" => Ok(PlaylistPhase::Searching),
            "creating" => Ok(PlaylistPhase::Creating),
            "populating" => Ok(PlaylistPhase::Populating),
            "done" => Ok(PlaylistPhase::Done),
            _ => Err(MigrationError::InvalidPlaylistPhase(s.to_string())),
        }
    }
}

impl std::fmt::Display for PlaylistPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a playlist reached `Done`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaylistCompletion {
    /// Search only, nothing written
    DryRun,
    /// Destination refused the playlist; search results are still recorded
    CreationFailed,
    /// Every found track was submitted
    Populated,
    /// A batch failed; earlier batches stay in place
    PartiallyPopulated,
}

impl PlaylistCompletion {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaylistCompletion::DryRun => "dry_run",
            PlaylistCompletion::CreationFailed => "creation_failed",
            PlaylistCompletion::Populated => "populated",
            PlaylistCompletion::PartiallyPopulated => "partially_populated",
        }
    }

    /// Phase that must precede `Done` for this completion
    fn required_phase(&self) -> PlaylistPhase {
        match self {
            PlaylistCompletion::DryRun => PlaylistPhase::Searching,
            PlaylistCompletion::CreationFailed => PlaylistPhase::Creating,
            PlaylistCompletion::Populated | PlaylistCompletion::PartiallyPopulated => {
                PlaylistPhase::Populating
            }
        }
    }
}

impl std::fmt::Display for PlaylistCompletion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Progress Types
// ============================================================================

/// Matching progress within one playlist
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationProgress {
    pub items_processed: usize,
    pub items_total: usize,
    pub items_found: usize,
    /// Progress percentage (0-100)
    pub percent: u8,
}

impl MigrationProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, items_processed: usize, items_total: usize, items_found: usize) {
        self.items_processed = items_processed;
        self.items_total = items_total;
        self.items_found = items_found;

        self.percent = if items_total > 0 {
            ((items_processed as f64 / items_total as f64) * 100.0).min(100.0) as u8
        } else {
            0
        };
    }
}

// ============================================================================
// Playlist Migration Entity
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistMigration {
    pub playlist_id: String,
    pub phase: PlaylistPhase,
    pub completion: Option<PlaylistCompletion>,
    pub progress: MigrationProgress,
}

impl PlaylistMigration {
    pub fn new(playlist_id: impl Into<String>) -> Self {
        Self {
            playlist_id: playlist_id.into(),
            phase: PlaylistPhase::Pending,
            completion: None,
            progress: MigrationProgress::new(),
        }
    }

    pub fn begin_search(&mut self, items_total: usize) -> Result<()> {
        self.transition(PlaylistPhase::Searching)?;
        self.progress.update(0, items_total, 0);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error unless the playlist is `Searching`.
    pub fn update_progress(&mut self, items_processed: usize, items_found: usize) -> Result<()> {
        if self.phase != PlaylistPhase::Searching {
            return Err(MigrationError::InvalidStateTransition {
                from: self.phase.as_str().to_string(),
                to: "update_progress".to_string(),
                reason: "Playlist must be searching to update progress".to_string(),
            });
        }

        let total = self.progress.items_total;
        self.progress.update(items_processed, total, items_found);
        Ok(())
    }

    pub fn begin_creation(&mut self) -> Result<()> {
        self.transition(PlaylistPhase::Creating)
    }

    pub fn begin_population(&mut self) -> Result<()> {
        self.transition(PlaylistPhase::Populating)
    }

    /// Move to `Done`, checking the completion against the current phase.
    pub fn finish(&mut self, completion: PlaylistCompletion) -> Result<()> {
        let required = completion.required_phase();
        if self.phase != required {
            return Err(MigrationError::InvalidStateTransition {
                from: self.phase.as_str().to_string(),
                to: PlaylistPhase::Done.as_str().to_string(),
                reason: format!(
                    "Completion {} requires phase {}",
                    completion.as_str(),
                    required.as_str()
                ),
            });
        }

        self.transition(PlaylistPhase::Done)?;
        self.completion = Some(completion);
        Ok(())
    }

    fn transition(&mut self, to: PlaylistPhase) -> Result<()> {
        self.validate_transition(to)?;
        self.phase = to;
        Ok(())
    }

    fn validate_transition(&self, to: PlaylistPhase) -> Result<()> {
        let valid = matches!(
            (self.phase, to),
            (PlaylistPhase::Pending, PlaylistPhase::Searching)
                | (PlaylistPhase::Searching, PlaylistPhase::Creating)
                | (PlaylistPhase::Searching, PlaylistPhase::Done)
                | (PlaylistPhase::Creating, PlaylistPhase::Populating)
                | (PlaylistPhase::Creating, PlaylistPhase::Done)
                | (PlaylistPhase::Populating, PlaylistPhase::Done)
        );

        if !valid {
            return Err(MigrationError::InvalidStateTransition {
                from: self.phase.as_str().to_string(),
                to: to.as_str().to_string(),
                reason: format!(
                    "Cannot transition from {} to {}",
                    self.phase.as_str(),
                    to.as_str()
                ),
            });
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
