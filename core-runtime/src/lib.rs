//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the migration core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the matching and migration
//! crates depend on. It establishes the logging conventions, the injected
//! configuration, and the event broadcasting used to report progress of a
//! long-running migration to its host.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{CoreConfig, CoreConfigBuilder, ThrottleConfig};
pub use error::{Error, Result};
pub use events::{CoreEvent, EventBus, EventStream};
