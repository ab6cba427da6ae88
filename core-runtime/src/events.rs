//! # Event Bus System
//!
//! Provides an event-driven architecture for the migration core using `tokio::sync::broadcast`.
//! Hosts subscribe to follow a long-running migration without polling it.
//!
//! ## Overview
//!
//! The event bus system consists of:
//! - **Event Types**: Strongly-typed enum hierarchies for each pass of a run
//! - **EventBus**: Central broadcast channel for publishing events
//! - **EventStream**: Wrapper for consuming events with filtering
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐   emit    ┌───────────┐
//! │ Playlist pass    ├──────────>│           │     subscribe    ┌────────────┐
//! └──────────────────┘           │ EventBus  ├─────────────────>│ Progress UI│
//!                                │ (broadcast│                  └────────────┘
//! ┌──────────────────┐   emit    │  channel) │     subscribe    ┌────────────┐
//! │ Artist check     ├──────────>│           ├─────────────────>│ Log writer │
//! └──────────────────┘           └───────────┘                  └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, CoreEvent, MigrationEvent};
//!
//! let event_bus = EventBus::new(100);
//! let event = CoreEvent::Migration(MigrationEvent::PlaylistCreationFailed {
//!     run_id: "run-1".to_string(),
//!     playlist_id: "37i9dQZF1DXcBWIGoYBM5M".to_string(),
//!     message: "quota exceeded".to_string(),
//! });
//!
//! // Nobody is listening; emission is fire-and-forget.
//! event_bus.emit(event).ok();
//! ```
//!
//! ### Filtering Events
//!
//! ```rust
//! use core_runtime::events::{EventBus, EventStream, CoreEvent, EventSeverity};
//!
//! let event_bus = EventBus::new(100);
//! let failures = EventStream::new(event_bus.subscribe())
//!     .filter(|event| event.severity() >= EventSeverity::Warning);
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: Subscriber was too slow and missed `n` events.
//!   Non-fatal; the subscriber keeps receiving newer events.
//! - **`RecvError::Closed`**: All senders have been dropped. Treat as shutdown.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum published through the event bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Playlist migration pass
    Migration(MigrationEvent),
    /// Artist availability pass
    ArtistCheck(ArtistCheckEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Migration(e) => e.description(),
            CoreEvent::ArtistCheck(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Migration(MigrationEvent::RunFailed { .. }) => EventSeverity::Error,
            CoreEvent::Migration(MigrationEvent::PlaylistCreationFailed { .. }) => {
                EventSeverity::Warning
            }
            CoreEvent::Migration(MigrationEvent::RunCancelled { .. }) => EventSeverity::Warning,
            CoreEvent::Migration(MigrationEvent::PlaylistCompleted { failure: Some(_), .. }) => {
                EventSeverity::Warning
            }
            CoreEvent::Migration(MigrationEvent::RunStarted { .. })
            | CoreEvent::Migration(MigrationEvent::PlaylistCompleted { .. })
            | CoreEvent::Migration(MigrationEvent::RunCompleted { .. })
            | CoreEvent::ArtistCheck(ArtistCheckEvent::Completed { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Migration Events
// ============================================================================

/// Events emitted while playlists are matched and written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum MigrationEvent {
    /// A run began.
    RunStarted {
        run_id: String,
        playlist_count: usize,
        track_count: usize,
        dry_run: bool,
    },
    /// Matching began for one playlist.
    PlaylistStarted {
        run_id: String,
        playlist_id: String,
        name: String,
        /// 1-based position in the snapshot
        position: usize,
        playlist_count: usize,
        track_count: usize,
    },
    /// Periodic matching progress within a playlist.
    Progress {
        run_id: String,
        playlist_id: String,
        tracks_processed: usize,
        tracks_total: usize,
        tracks_found: usize,
        /// Progress percentage (0-100).
        percent: u8,
    },
    /// A playlist reached its terminal phase.
    PlaylistCompleted {
        run_id: String,
        playlist_id: String,
        destination_playlist_id: Option<String>,
        tracks_found: usize,
        tracks_total: usize,
        tracks_added: usize,
        match_rate: f64,
        failure: Option<String>,
    },
    /// The destination refused to create a playlist; the run continues.
    PlaylistCreationFailed {
        run_id: String,
        playlist_id: String,
        message: String,
    },
    /// All playlists were processed.
    RunCompleted {
        run_id: String,
        playlists: usize,
        tracks_total: usize,
        tracks_found: usize,
        match_rate: f64,
        duration_secs: u64,
    },
    /// Cancellation was observed at a safe boundary.
    RunCancelled {
        run_id: String,
        playlists_completed: usize,
    },
    /// The run aborted.
    RunFailed { run_id: String, message: String },
}

impl MigrationEvent {
    fn description(&self) -> &str {
        match self {
            MigrationEvent::RunStarted { .. } => "Migration started",
            MigrationEvent::PlaylistStarted { .. } => "Matching playlist tracks",
            MigrationEvent::Progress { .. } => "Matching in progress",
            MigrationEvent::PlaylistCompleted { .. } => "Playlist migrated",
            MigrationEvent::PlaylistCreationFailed { .. } => "Playlist creation failed",
            MigrationEvent::RunCompleted { .. } => "Migration completed",
            MigrationEvent::RunCancelled { .. } => "Migration cancelled",
            MigrationEvent::RunFailed { .. } => "Migration failed",
        }
    }
}

// ============================================================================
// Artist Check Events
// ============================================================================

/// Events emitted while artists are looked up in the destination.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum ArtistCheckEvent {
    Started {
        run_id: String,
        artist_count: usize,
    },
    Progress {
        run_id: String,
        artists_processed: usize,
        artists_total: usize,
        artists_found: usize,
        percent: u8,
    },
    Completed {
        run_id: String,
        artists_total: usize,
        artists_found: usize,
    },
}

impl ArtistCheckEvent {
    fn description(&self) -> &str {
        match self {
            ArtistCheckEvent::Started { .. } => "Artist check started",
            ArtistCheckEvent::Progress { .. } => "Artist check in progress",
            ArtistCheckEvent::Completed { .. } => "Artist check completed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Cloning is cheap; all clones share the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// A subscriber that falls behind by more than `capacity` events receives
    /// `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if there are none. Callers that do not care use `.ok()`.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    ///
    /// ```rust
    /// use core_runtime::events::EventBus;
    ///
    /// let event_bus = EventBus::new(100);
    /// assert_eq!(event_bus.subscriber_count(), 0);
    ///
    /// let _subscriber = event_bus.subscribe();
    /// assert_eq!(event_bus.subscriber_count(), 1);
    /// ```
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned by `recv()`/`try_recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no matching events are currently available.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn run_started() -> CoreEvent {
        CoreEvent::Migration(MigrationEvent::RunStarted {
            run_id: "run-1".to_string(),
            playlist_count: 2,
            track_count: 40,
            dry_run: false,
        })
    }

    fn creation_failed() -> CoreEvent {
        CoreEvent::Migration(MigrationEvent::PlaylistCreationFailed {
            run_id: "run-1".to_string(),
            playlist_id: "pl-1".to_string(),
            message: "quota exceeded".to_string(),
        })
    }

    #[tokio::test]
    async fn test_emission_without_subscribers_is_an_error() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);
        assert!(bus.emit(run_started()).is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        assert_eq!(bus.emit(run_started()).unwrap(), 2);

        assert_eq!(sub1.recv().await.unwrap(), run_started());
        assert_eq!(sub2.recv().await.unwrap(), run_started());
    }

    #[tokio::test]
    async fn test_event_stream_with_filter() {
        let bus = EventBus::default();
        let mut stream = EventStream::new(bus.subscribe())
            .filter(|event| event.severity() >= EventSeverity::Warning);

        bus.emit(run_started()).ok();
        bus.emit(creation_failed()).ok();

        assert_eq!(stream.recv().await.unwrap(), creation_failed());
        assert!(stream.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for i in 0..5 {
            bus.emit(CoreEvent::ArtistCheck(ArtistCheckEvent::Progress {
                run_id: "run-1".to_string(),
                artists_processed: i,
                artists_total: 5,
                artists_found: 0,
                percent: (i * 20) as u8,
            }))
            .ok();
        }

        assert!(matches!(sub.recv().await, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn test_event_severity() {
        assert_eq!(
            CoreEvent::Migration(MigrationEvent::RunFailed {
                run_id: "run-1".to_string(),
                message: "session expired".to_string(),
            })
            .severity(),
            EventSeverity::Error
        );
        assert_eq!(creation_failed().severity(), EventSeverity::Warning);
        assert_eq!(run_started().severity(), EventSeverity::Info);

        let partial = CoreEvent::Migration(MigrationEvent::PlaylistCompleted {
            run_id: "run-1".to_string(),
            playlist_id: "pl-1".to_string(),
            destination_playlist_id: Some("d-1".to_string()),
            tracks_found: 150,
            tracks_total: 160,
            tracks_added: 100,
            match_rate: 0.9375,
            failure: Some("batch 2 rejected".to_string()),
        });
        assert_eq!(partial.severity(), EventSeverity::Warning);

        let progress = CoreEvent::Migration(MigrationEvent::Progress {
            run_id: "run-1".to_string(),
            playlist_id: "pl-1".to_string(),
            tracks_processed: 10,
            tracks_total: 40,
            tracks_found: 9,
            percent: 25,
        });
        assert_eq!(progress.severity(), EventSeverity::Debug);
    }

    #[test]
    fn test_event_description() {
        assert_eq!(run_started().description(), "Migration started");
        assert_eq!(
            CoreEvent::ArtistCheck(ArtistCheckEvent::Completed {
                run_id: "run-1".to_string(),
                artists_total: 3,
                artists_found: 2,
            })
            .description(),
            "Artist check completed"
        );
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_value(creation_failed()).unwrap();
        assert_eq!(json["type"], "Migration");
        assert_eq!(json["payload"]["event"], "PlaylistCreationFailed");

        let back: CoreEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, creation_failed());
    }
}
