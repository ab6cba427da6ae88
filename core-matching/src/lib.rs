//! # Cross-Catalog Matching
//!
//! Resolves source tracks and artists to entities in the destination catalog.
//!
//! ## Overview
//!
//! The source and destination catalogs share no identifiers, so every lookup
//! goes through the destination's search API:
//!
//! - [`TrackMatcher`] walks a strategy ladder: exact recording code, then a
//!   case-folded title/artist overlap, then the destination's first hit.
//! - [`ArtistMatcher`] accepts the destination's top hit for a name search.
//! - [`RateLimiter`] spaces destination calls; callers throttle after each
//!   lookup.
//!
//! Lookups never fail for ordinary destination trouble. Timeouts, throttling
//! and malformed responses come back as [`MatchResult::NotFound`] with the
//! error text attached. Only a dead destination session surfaces as
//! [`MatchingError::Authentication`].
//!
//! ## Usage
//!
//! ```ignore
//! use core_matching::{TrackMatcher, MatchResult};
//!
//! let matcher = TrackMatcher::new(catalog.clone());
//! match matcher.match_track(&track).await? {
//!     MatchResult::Found(entity) => println!("{} via {}", entity.destination_id, entity.strategy),
//!     MatchResult::NotFound { error } => println!("missing: {:?}", error),
//! }
//! ```

pub mod artist_matcher;
pub mod error;
pub mod rate_limiter;
pub mod result;
pub mod track_matcher;

pub use artist_matcher::{ArtistMatcher, ARTIST_CANDIDATE_LIMIT};
pub use error::{MatchingError, Result};
pub use rate_limiter::{FixedDelayLimiter, RateLimiter, ThrottleSet};
pub use result::{MatchResult, MatchStrategy, MatchedEntity};
pub use track_matcher::{
    TrackMatcher, EXACT_CODE_CANDIDATE_LIMIT, FUZZY_CANDIDATE_LIMIT, FUZZY_QUERY_ARTIST_LIMIT,
};
