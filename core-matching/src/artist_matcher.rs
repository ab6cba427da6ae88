//! Artist availability lookup
//!
//! Artists carry no cross-catalog code, so the destination's own ranking is
//! trusted: the top hit of a name search is accepted without verification.

use crate::error::{MatchingError, Result};
use crate::result::{MatchResult, MatchStrategy};
use bridge_traits::catalog::DestinationCatalog;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Candidates fetched per artist search
pub const ARTIST_CANDIDATE_LIMIT: usize = 5;

pub struct ArtistMatcher {
    catalog: Arc<dyn DestinationCatalog>,
}

impl ArtistMatcher {
    pub fn new(catalog: Arc<dyn DestinationCatalog>) -> Self {
        Self { catalog }
    }

    /// Resolve an artist by name.
    ///
    /// Search failures come back as `NotFound` carrying the error text. Only
    /// an authentication failure is returned as an error.
    #[instrument(skip(self))]
    pub async fn match_artist(&self, name: &str) -> Result<MatchResult> {
        let candidates = match self
            .catalog
            .search_artists(name, ARTIST_CANDIDATE_LIMIT)
            .await
        {
            Ok(candidates) => candidates,
            Err(e) => {
                if let Some(fatal) = MatchingError::escalate(&e) {
                    return Err(fatal);
                }
                warn!(error = %e, "Artist search failed");
                return Ok(MatchResult::not_found_with_error(e.to_string()));
            }
        };

        match candidates
            .into_iter()
            .find(|candidate| !candidate.id.trim().is_empty())
        {
            Some(top) => {
                debug!(destination_id = %top.id, destination_name = %top.name, "Artist found");
                Ok(MatchResult::from_artist_candidate(
                    top,
                    MatchStrategy::FirstCandidateFallback,
                ))
            }
            None => {
                debug!("Artist not found");
                Ok(MatchResult::not_found())
            }
        }
    }
}
