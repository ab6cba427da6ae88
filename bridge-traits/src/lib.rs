//! # Host Bridge Traits
//!
//! Abstraction traits that each host must implement for the migration core.
//!
//! ## Overview
//!
//! This crate defines the contract between the core and the outside world.
//! Anything that touches a network, a session or a wall clock lives behind a
//! trait here so the matching and migration logic stays deterministic and
//! testable.
//!
//! ## Traits
//!
//! ### Catalog Access
//! - [`DestinationCatalog`](catalog::DestinationCatalog) - Search, playlist creation and batch population
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](log::LoggerSink) - Forward structured logs to host logging
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! must map their native failures onto it so the core can apply its
//! propagation policy:
//!
//! - `Transient` failures during searches are absorbed into "not found" results
//! - `Unauthorized` aborts the whole migration run
//! - everything else is recorded against the item that caused it
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so implementations can be held in
//! an `Arc` and shared across async tasks.
//!
//! ## Example
//!
//! ```ignore
//! use bridge_traits::catalog::{DestinationCatalog, TrackCandidate};
//! use bridge_traits::error::{BridgeError, Result};
//! use async_trait::async_trait;
//!
//! #[async_trait]
//! impl DestinationCatalog for MyCatalog {
//!     async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<TrackCandidate>> {
//!         self.client
//!             .search(query, limit)
//!             .await
//!             .map_err(|e| BridgeError::Transient(e.to_string()))
//!     }
//!     // ...
//! }
//! ```

pub mod catalog;
pub mod error;
pub mod log;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use catalog::{ArtistCandidate, DestinationCatalog, TrackCandidate, MAX_ITEMS_PER_ADD};
pub use log::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use time::{Clock, FixedClock, SystemClock};
