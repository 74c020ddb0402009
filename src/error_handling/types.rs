//! Error type definitions.
//!
//! Collector failures never appear here: they are absorbed into
//! `SignalResult::Unavailable` at the collector boundary and surface only
//! through the assessment breakdown. These types cover the failures that
//! *are* allowed to reach a caller.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    Logger(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClient(#[from] ReqwestError),

    /// Error initializing the DNS resolver.
    #[error("DNS resolver initialization error: {0}")]
    DnsResolver(String),
}

/// Errors surfaced to callers of the scan pipeline and the incident store.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The input could not be parsed as an http/https URL even after
    /// default-scheme normalization. Rejected before any collector runs.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// The input is not a plausible email address. Rejected before the
    /// breach collector runs.
    #[error("invalid email: {0}")]
    InvalidEmail(String),

    /// An incident with this id already exists; the store never
    /// overwrites.
    #[error("incident {0} already exists")]
    DuplicateIncident(String),

    /// Feedback referenced an incident id that does not resolve to a
    /// stored report.
    #[error("unknown incident: {0}")]
    UnknownIncident(String),

    /// The database file could not be created or opened.
    #[error("database file error: {0}")]
    FileCreation(String),

    /// A stored record failed to serialize or deserialize.
    #[error("corrupt incident record: {0}")]
    CorruptRecord(String),

    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ScanError {
    /// True when the caller supplied bad input (client error), false when
    /// the failure is on our side.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ScanError::InvalidUrl(_)
                | ScanError::InvalidEmail(_)
                | ScanError::DuplicateIncident(_)
                | ScanError::UnknownIncident(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(ScanError::InvalidUrl("x".into()).is_client_error());
        assert!(ScanError::InvalidEmail("x".into()).is_client_error());
        assert!(ScanError::DuplicateIncident("inc_1".into()).is_client_error());
        assert!(ScanError::UnknownIncident("inc_1".into()).is_client_error());
        assert!(!ScanError::Database(sqlx::Error::RowNotFound).is_client_error());
    }

    #[test]
    fn test_error_display() {
        let err = ScanError::InvalidUrl("not a url".into());
        assert_eq!(err.to_string(), "invalid url: not a url");

        let err = ScanError::UnknownIncident("inc_123".into());
        assert_eq!(err.to_string(), "unknown incident: inc_123");
    }
}
