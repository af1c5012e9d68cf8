//! Oracle error types.

use std::fmt;

use serde::Serialize;

/// How an oracle failure affects a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The credentials were rejected. Fatal for the whole session.
    OracleAuth,
    /// The oracle found no route between the points.
    OracleNoRoute,
    /// Anything else: network trouble, rate limiting, malformed responses.
    OracleTransient,
    /// The engine could not use an otherwise valid response.
    EngineInternal,
}

/// Errors from a routing or place-search oracle.
#[derive(Debug)]
pub enum OracleError {
    /// The oracle refused the request (`REQUEST_DENIED`, HTTP 401/403).
    RequestDenied(String),

    /// No route or result exists (`ZERO_RESULTS`, `NOT_FOUND`).
    ZeroResults,

    /// Rate limited by the oracle (`OVER_QUERY_LIMIT`, HTTP 429).
    RateLimited,

    /// The oracle returned an unexpected status.
    Api { status: String, message: String },

    /// HTTP request failed (network error, timeout, etc.)
    Http(reqwest::Error),

    /// Response could not be decoded.
    Json {
        message: String,
        body: Option<String>,
    },

    /// The request queue worker is gone.
    QueueClosed,
}

impl OracleError {
    /// Classify this error for fallback decisions.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OracleError::RequestDenied(_) => ErrorKind::OracleAuth,
            OracleError::ZeroResults => ErrorKind::OracleNoRoute,
            OracleError::RateLimited
            | OracleError::Api { .. }
            | OracleError::Http(_)
            | OracleError::Json { .. }
            | OracleError::QueueClosed => ErrorKind::OracleTransient,
        }
    }

    /// True if the credentials were rejected.
    pub fn is_auth(&self) -> bool {
        self.kind() == ErrorKind::OracleAuth
    }
}

impl fmt::Display for OracleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OracleError::RequestDenied(msg) => write!(f, "request denied: {msg}"),
            OracleError::ZeroResults => write!(f, "no results"),
            OracleError::RateLimited => write!(f, "rate limited by oracle"),
            OracleError::Api { status, message } => {
                write!(f, "API error {status}: {message}")
            }
            OracleError::Http(e) => write!(f, "HTTP error: {e}"),
            OracleError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            OracleError::QueueClosed => write!(f, "request queue closed"),
        }
    }
}

impl std::error::Error for OracleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OracleError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for OracleError {
    fn from(err: reqwest::Error) -> Self {
        OracleError::Http(err)
    }
}
