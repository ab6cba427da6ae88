use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Failures a matcher refuses to absorb.
///
/// Every other destination failure is converted into a
/// [`MatchResult::NotFound`](crate::MatchResult::NotFound).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchingError {
    #[error("Destination authentication failed: {0}")]
    Authentication(String),
}

impl MatchingError {
    /// Returns the error to propagate, or `None` if the failure is absorbable.
    pub(crate) fn escalate(error: &BridgeError) -> Option<Self> {
        if error.is_authentication() {
            Some(MatchingError::Authentication(error.to_string()))
        } else {
            None
        }
    }
}

pub type Result<T> = std::result::Result<T, MatchingError>;
