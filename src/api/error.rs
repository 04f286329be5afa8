//! Error types for calls to the focus-scoring service.
//!
//! Every failure here is recoverable: the session controller substitutes a
//! safe default and keeps going. Only the login command reports them to the
//! user.

use thiserror::Error;

/// Errors that can occur while talking to the focus-scoring service.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// The configured base URL cannot be parsed.
    #[error("invalid service URL '{0}'")]
    InvalidUrl(String),

    /// Transport failure or undecodable body.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("{endpoint} failed with status {status}")]
    HttpStatus {
        endpoint: &'static str,
        status: reqwest::StatusCode,
    },

    /// The service answered but reported a failure in the payload.
    #[error("{endpoint} rejected the request: {message}")]
    Rejected {
        endpoint: &'static str,
        message: String,
    },

    /// The service could not produce an answer.
    #[error("{0} is unavailable")]
    Unavailable(&'static str),
}

impl ApiError {
    /// Returns true if the error is a transport-level problem (connect, timeout).
    #[must_use]
    pub fn is_connection(&self) -> bool {
        match self {
            Self::Http(e) => e.is_connect() || e.is_timeout(),
            Self::Unavailable(_) => true,
            _ => false,
        }
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) => "pass a full URL such as http://127.0.0.1:5000 to --server",
            Self::Http(_) | Self::Unavailable(_) => {
                "check that the focus service is running and reachable"
            }
            Self::HttpStatus { .. } => "check the focus service logs for the failing endpoint",
            Self::Rejected { .. } => "the service refused the request; see its message",
        }
    }
}
