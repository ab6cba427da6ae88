//! # Core Configuration Module
//!
//! Provides configuration management for the migration core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds the injected destination catalog and the tunables of a
//! migration run. It enforces fail-fast validation so a run never starts with
//! a missing bridge or a nonsensical throttle.
//!
//! ## Required Dependencies
//!
//! - `DestinationCatalog` - Search and playlist-writing access to the target service
//!
//! ## Optional Dependencies (with defaults)
//!
//! - `Clock` - Timestamp source for reports (default: `SystemClock`)
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{CoreConfig, ThrottleConfig};
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .destination_catalog(Arc::new(MyCatalog::new(session)))
//!     .throttle(ThrottleConfig::default().with_batch_add_ms(750))
//!     .progress_interval(25)
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::CoreConfig;
//!
//! // No destination catalog was injected
//! let config = CoreConfig::builder()
//!     .build()
//!     .expect("Should fail - missing destination catalog");
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{Clock, DestinationCatalog, SystemClock};
use std::sync::Arc;

/// Default tracks between progress events
pub const DEFAULT_PROGRESS_INTERVAL: usize = 10;

const MAX_THROTTLE_MS: u64 = 60_000;

/// Core configuration for a migration run.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Destination catalog the library is migrated to (required)
    pub destination_catalog: Arc<dyn DestinationCatalog>,

    /// Time source for run timestamps
    pub clock: Arc<dyn Clock>,

    /// Minimum spacing between destination calls
    pub throttle: ThrottleConfig,

    /// Emit a progress event every `progress_interval` tracks
    pub progress_interval: usize,

    /// Broadcast capacity of the event bus
    pub event_buffer_size: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("destination_catalog", &"DestinationCatalog { ... }")
            .field("clock", &"Clock { ... }")
            .field("throttle", &self.throttle)
            .field("progress_interval", &self.progress_interval)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

/// Minimum spacing, in milliseconds, between destination calls of each class.
///
/// The destination throttles aggressive clients; these defaults are spaced
/// widely enough for multi-hour runs to finish without being rate limited.
///
/// # Example
///
/// ```
/// use core_runtime::config::ThrottleConfig;
///
/// let throttle = ThrottleConfig::default().with_track_search_ms(250);
/// assert_eq!(throttle.track_search_ms, 250);
/// assert_eq!(throttle.batch_add_ms, 500);
/// assert!(throttle.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleConfig {
    /// After every track search (default 200ms)
    pub track_search_ms: u64,

    /// After every playlist batch-add (default 500ms)
    pub batch_add_ms: u64,

    /// After every artist search (default 300ms)
    pub artist_search_ms: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            track_search_ms: 200,
            batch_add_ms: 500,
            artist_search_ms: 300,
        }
    }
}

impl ThrottleConfig {
    pub fn with_track_search_ms(mut self, millis: u64) -> Self {
        self.track_search_ms = millis;
        self
    }

    pub fn with_batch_add_ms(mut self, millis: u64) -> Self {
        self.batch_add_ms = millis;
        self
    }

    pub fn with_artist_search_ms(mut self, millis: u64) -> Self {
        self.artist_search_ms = millis;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("track search", self.track_search_ms),
            ("batch add", self.batch_add_ms),
            ("artist search", self.artist_search_ms),
        ] {
            if value == 0 {
                return Err(Error::Config(format!(
                    "Throttle delay for {} must be greater than 0ms",
                    name
                )));
            }

            if value > MAX_THROTTLE_MS {
                return Err(Error::Config(format!(
                    "Throttle delay for {} exceeds maximum of 60 seconds (60,000ms)",
                    name
                )));
            }
        }

        Ok(())
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Throttle delays are within 1ms..=60s
    /// - Progress interval is > 0
    /// - Event buffer size is > 0
    pub fn validate(&self) -> Result<()> {
        self.throttle.validate()?;

        if self.progress_interval == 0 {
            return Err(Error::Config(
                "Progress interval must be greater than 0 tracks".to_string(),
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn destination_catalog_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "DestinationCatalog".to_string(),
        message: "DestinationCatalog implementation is required to search and write playlists. \
                 Inject an authenticated client for the target service with \
                 .destination_catalog()."
            .to_string(),
    }
}

/// Builder for constructing [`CoreConfig`] instances.
///
/// Call [`build()`](CoreConfigBuilder::build) to validate and create the
/// final config.
#[derive(Default)]
pub struct CoreConfigBuilder {
    destination_catalog: Option<Arc<dyn DestinationCatalog>>,
    clock: Option<Arc<dyn Clock>>,
    throttle: Option<ThrottleConfig>,
    progress_interval: Option<usize>,
    event_buffer_size: Option<usize>,
}

impl CoreConfigBuilder {
    /// Sets the destination catalog implementation (required).
    ///
    /// The catalog must already be authenticated; the core never handles
    /// sessions.
    pub fn destination_catalog(mut self, catalog: Arc<dyn DestinationCatalog>) -> Self {
        self.destination_catalog = Some(catalog);
        self
    }

    /// Sets the clock used for run timestamps.
    ///
    /// Default: [`SystemClock`]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Sets the destination call spacing.
    pub fn throttle(mut self, throttle: ThrottleConfig) -> Self {
        self.throttle = Some(throttle);
        self
    }

    /// Sets how many tracks pass between progress events.
    ///
    /// Default: 10
    pub fn progress_interval(mut self, tracks: usize) -> Self {
        self.progress_interval = Some(tracks);
        self
    }

    /// Sets the event bus capacity.
    ///
    /// Default: 100
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Returns
    ///
    /// Returns `Ok(CoreConfig)` on success, or an error if:
    /// - The destination catalog is missing
    /// - Configuration values are invalid
    pub fn build(self) -> Result<CoreConfig> {
        let destination_catalog = self
            .destination_catalog
            .ok_or_else(destination_catalog_missing_error)?;

        let config = CoreConfig {
            destination_catalog,
            clock: self
                .clock
                .unwrap_or_else(|| Arc::new(SystemClock::default())),
            throttle: self.throttle.unwrap_or_default(),
            progress_interval: self.progress_interval.unwrap_or(DEFAULT_PROGRESS_INTERVAL),
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;

        Ok(config)
    }
}
