//! Error types for the affiliate API client.

use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Affiliate API client errors.
///
/// `Network` means no response ever arrived. `Http` and `Rejected` both carry
/// the status code of a response that did arrive; `status()` returning `Some`
/// is how callers tell the two failure classes from a dead transport.
///
/// Variants hold plain strings so the type stays `Clone` and cached outcomes
/// can be replayed to later callers.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Configuration error (missing base URL, invalid settings)
    #[error("configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, timeout; request got no response)
    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx HTTP response
    #[error("server returned {status}: {message}")]
    Http { status: u16, message: String },

    /// 2xx response whose business envelope reports failure
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Response body did not decode into the expected shape
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Session persistence failure (read/write of the session file)
    #[error("session storage error: {0}")]
    Storage(String),
}

impl ApiError {
    /// Status code of the response, when one was received at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } | ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the call reached the server but was refused at the
    /// application level.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ApiError::Rejected { .. })
    }

    /// Server-supplied message, when the failure came with one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Http { message, .. } | ApiError::Rejected { message, .. } => {
                Some(message.as_str())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_present_only_when_a_response_arrived() {
        assert_eq!(ApiError::Network("timed out".into()).status(), None);
        assert_eq!(
            ApiError::Http {
                status: 500,
                message: "oops".into()
            }
            .status(),
            Some(500)
        );
        assert_eq!(
            ApiError::Rejected {
                status: 400,
                message: "no".into()
            }
            .status(),
            Some(400)
        );
    }

    #[test]
    fn rejection_is_distinguishable_from_http_failure() {
        let rejected = ApiError::Rejected {
            status: 400,
            message: "Invalid code".into(),
        };
        let http = ApiError::Http {
            status: 401,
            message: "Unauthorized".into(),
        };
        assert!(rejected.is_rejection());
        assert!(!http.is_rejection());
    }
}
