//! # Catalog Migrator
//!
//! Moves a music library from one streaming catalog to another.
//!
//! ## Overview
//!
//! Hosts collect a [`CatalogSnapshot`] from the source service, implement
//! [`DestinationCatalog`] for the target service and hand both to a
//! [`MigrationOrchestrator`]. The orchestrator matches every track and artist,
//! recreates the playlists and returns per-item outcomes plus summaries that a
//! report renderer can consume directly.
//!
//! This crate only re-exports the workspace crates so hosts need a single
//! dependency:
//!
//! - [`bridge_traits`]: host-implemented capabilities
//! - [`core_runtime`]: configuration, events and logging
//! - [`core_library`]: source-side models
//! - [`core_matching`]: track and artist matching, throttling
//! - [`core_migration`]: run orchestration and results
//!
//! ## Usage
//!
//! ```ignore
//! use catalog_migrator::{CoreConfig, MigrationOrchestrator};
//! use tokio_util::sync::CancellationToken;
//!
//! let config = CoreConfig::builder()
//!     .destination_catalog(Arc::new(MyDestination::connect().await?))
//!     .build()?;
//!
//! let orchestrator = MigrationOrchestrator::from_config(&config)?;
//! let report = orchestrator
//!     .run(&snapshot, false, &CancellationToken::new())
//!     .await?;
//! ```

pub use bridge_traits;
pub use core_library;
pub use core_matching;
pub use core_migration;
pub use core_runtime;

pub use bridge_traits::{BridgeError, Clock, DestinationCatalog, LoggerSink};
pub use core_library::{Artist, CatalogSnapshot, Playlist, Track};
pub use core_matching::{MatchResult, MatchStrategy, ThrottleSet};
pub use core_migration::{
    ArtistCheckOutcome, MigrationError, MigrationOrchestrator, MigrationReport,
    PlaylistMigrationOutcome,
};
pub use core_runtime::{CoreConfig, CoreEvent, EventBus, ThrottleConfig};
