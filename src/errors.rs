//! Error types for the redditsaved application.
//!
//! This module defines custom error types that categorize the failures that
//! can occur while fetching, backing up, filtering and reporting saved items.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Failures raised while establishing a session with the remote account.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The provider rejected the username/password or the client credentials.
    #[error("Invalid credentials: {message}")]
    InvalidCredentials { message: String },

    /// Network trouble or a provider-side hiccup; worth another attempt.
    #[error("Transient authentication failure: {message}")]
    Transient { message: String },

    /// Anything the provider answered that we do not understand.
    #[error("Unexpected authentication response: {message}")]
    Unexpected { message: String },
}

impl AuthError {
    /// Whether another authentication attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthError::Transient { .. })
    }
}

/// The main error type for the redditsaved application.
#[derive(Error, Debug)]
pub enum SavedError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transport-level HTTP failures.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Authentication failed for good.
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// The remote listing could not be retrieved in full.
    #[error("Fetch failed: {message}")]
    FetchFailed { message: String },

    /// The fetch did not finish before the configured deadline.
    #[error("Fetch did not complete within {seconds} seconds")]
    FetchTimedOut { seconds: u64 },

    /// A snapshot could not be read back.
    #[error("Restore failed: {message}")]
    RestoreFailed { message: String },

    /// A snapshot could not be written.
    #[error("Backup failed: {message}")]
    BackupFailed { message: String },

    /// The report file could not be written.
    #[error("Could not write report {path}: {source}")]
    ReportWriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Filtering left nothing to report.
    #[error("No saved items matched the given criteria")]
    NoMatches,

    /// Generic application error with a custom message.
    #[error("{message}")]
    ApplicationError { message: String },
}

impl SavedError {
    /// Process exit status for a fatal error.
    pub fn exit_code(&self) -> u8 {
        match self {
            SavedError::ConfigError { .. } => 2,
            SavedError::Auth(_) => 3,
            SavedError::NoMatches => 4,
            _ => 1,
        }
    }
}
