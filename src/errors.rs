/*!
 * Error types for the langcache application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when talking to an oracle provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// The request did not complete within the configured timeout
    #[error("API request timed out after {0} seconds")]
    Timeout(u64),

    /// Error when parsing an API response envelope fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors raised by the persistent translation cache
#[derive(Error, Debug)]
pub enum CacheError {
    /// The store could not be opened or bootstrapped
    #[error("Failed to open translation cache: {0}")]
    Open(String),

    /// A read or write against the store failed
    #[error("Translation cache query failed: {0}")]
    Query(String),
}

/// Errors surfaced by the translation engine
#[derive(Error, Debug)]
pub enum EngineError {
    /// The persistent cache cannot serve requests; fatal for the caller
    #[error("Translation cache unavailable: {0}")]
    CacheUnavailable(#[from] CacheError),
}

/// Errors from the bulk importer
#[derive(Error, Debug)]
pub enum ImportError {
    /// The archive could not be read from disk or network
    #[error("Failed to read archive: {0}")]
    Read(String),

    /// The archive is not a valid zip file
    #[error("Invalid zip archive: {0}")]
    InvalidArchive(String),

    /// Writing imported pairs to the cache failed
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}
