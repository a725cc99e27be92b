//! Error types for the network module.

use thiserror::Error;

/// Errors that can occur while talking to remote services.
#[derive(Debug, Error)]
pub enum NetError {
    /// The paying wallet cannot cover the upload.
    #[error("insufficient funds at {endpoint}: {body}")]
    InsufficientFunds { endpoint: String, body: String },

    /// The service could not be reached (DNS, connect, transport).
    #[error("cannot reach {endpoint}: {message}")]
    Connectivity { endpoint: String, message: String },

    /// No response within the allowed time.
    #[error("request to {endpoint} timed out")]
    Timeout { endpoint: String },

    /// The service answered with a non-success status.
    #[error("{endpoint} rejected the request (HTTP {status}): {body}")]
    Rejected {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The response body did not have the expected shape.
    #[error("unexpected response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    /// The name has no registration record.
    #[error("name {0:?} is not registered")]
    NameNotRegistered(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

impl NetError {
    /// Classify a transport-level failure.
    pub fn from_reqwest(endpoint: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NetError::Timeout {
                endpoint: endpoint.into(),
            }
        } else if err.is_decode() {
            NetError::Decode {
                endpoint: endpoint.into(),
                message: err.to_string(),
            }
        } else {
            NetError::Connectivity {
                endpoint: endpoint.into(),
                message: err.to_string(),
            }
        }
    }

    /// Classify a non-success HTTP response.
    ///
    /// 402, or a body that mentions insufficient balance, means the wallet
    /// must be funded; anything else is a plain rejection.
    pub fn from_status(endpoint: &str, status: u16, body: String) -> Self {
        if status == 402 || body.to_ascii_lowercase().contains("insufficient") {
            NetError::InsufficientFunds {
                endpoint: endpoint.into(),
                body,
            }
        } else {
            NetError::Rejected {
                endpoint: endpoint.into(),
                status,
                body,
            }
        }
    }

    pub fn is_insufficient_funds(&self) -> bool {
        matches!(self, NetError::InsufficientFunds { .. })
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(self, NetError::Connectivity { .. } | NetError::Timeout { .. })
    }
}

/// Result type for network operations.
pub type Result<T> = std::result::Result<T, NetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(NetError::from_status("POST /v1/tx", 402, String::new()).is_insufficient_funds());
        assert!(
            NetError::from_status("POST /v1/tx", 400, "Insufficient balance".into())
                .is_insufficient_funds()
        );
        match NetError::from_status("POST /v1/tx", 503, "busy".into()) {
            NetError::Rejected { status, body, .. } => {
                assert_eq!(status, 503);
                assert_eq!(body, "busy");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
