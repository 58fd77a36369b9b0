use chrono::{DateTime, Utc};
use thiserror::Error;

use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type Result<T> = std::result::Result<T, Error>;

#[allow(clippy::enum_variant_names)]
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid user reference: {0}")]
    InvalidUserRef(String),
    #[error("Search query must not be empty")]
    EmptyQuery,
    #[error("Credentials are required for {0}")]
    NotAuthenticated(String),
    #[error("Empty response from {0}")]
    EmptyResponse(String),
    #[error("Remote error: {0}")]
    Remote(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Cannot encode/decode JSON: {0}")]
    JSONError(#[from] serde_json::Error),
    #[error("IO Error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Network Error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Cannot parse URL: {0}")]
    UrlError(#[from] url::ParseError),
    #[error("HTTP status {status}")]
    HttpStatus { status: u16, body: String },
}

impl Error {
    /// Remote errors come embedded in an otherwise usable record, so they only warn.
    pub fn severity(&self) -> Severity {
        match self {
            Error::Remote(_) => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "twitter_client warning"),
            Severity::Error => write!(f, "twitter_client error"),
        }
    }
}

/// An error as it sits in the error buffer.
#[derive(Debug, Clone)]
pub struct ReportedError {
    pub severity: Severity,
    pub error: Arc<Error>,
    pub reported_at: DateTime<Utc>,
}

impl ReportedError {
    pub fn new(error: Error) -> Self {
        ReportedError {
            severity: error.severity(),
            error: Arc::new(error),
            reported_at: Utc::now(),
        }
    }
}

impl Display for ReportedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.severity, self.error)
    }
}
