//! Error type definitions.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Error types for crawl failures that end the whole run.
///
/// Collaborator-level fetch/parse failures are accumulated in the message
/// sink instead; only conditions that leave the pipeline without a usable
/// document graph surface as one of these.
#[derive(Error, Debug)]
pub enum CrawlError {
    /// No URL (or an empty one) was given.
    #[error("No url given")]
    NoUrl,

    /// The crawl produced no loaded HTML document among the initial set.
    /// Carries the url-or-descriptions of whatever initial resources were
    /// found instead.
    #[error("No HTML assets found ({})", .0.join(" "))]
    NoHtmlAssets(Vec<String>),
}
