use thiserror::Error;

/// Failure reported by a host-provided bridge implementation.
///
/// The variants classify failures so the core can decide whether to swallow,
/// localize, or abort on them without inspecting host-specific error types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// Network failure, timeout or upstream throttling. Retrying later may succeed.
    #[error("Transient failure: {0}")]
    Transient(String),

    /// The destination session is missing, invalid or expired.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The request was rejected as malformed (e.g. an oversized batch).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl BridgeError {
    /// Returns true when no further destination call can succeed.
    pub fn is_authentication(&self) -> bool {
        matches!(self, BridgeError::Unauthorized(_))
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, BridgeError::Transient(_))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(BridgeError::Unauthorized("expired".into()).is_authentication());
        assert!(!BridgeError::Unauthorized("expired".into()).is_transient());
        assert!(BridgeError::Transient("timeout".into()).is_transient());
        assert!(!BridgeError::OperationFailed("boom".into()).is_authentication());
    }

    #[test]
    fn test_error_display() {
        let err = BridgeError::InvalidRequest("batch of 101 items".to_string());
        assert_eq!(err.to_string(), "Invalid request: batch of 101 items");
    }
}
