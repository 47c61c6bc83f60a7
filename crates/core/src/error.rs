//! Error types for crawler operations.
//!
//! This module defines the main error type [`CrawlerError`] which represents
//! all possible errors that can occur while fetching board pages, decoding
//! article URLs, extracting records and writing output files.
//!
//! Most of these never escape a crawl: per-page and per-article failures are
//! logged and turned into skips or error records by [`crate::crawl::Crawler`].
//! Only sink failures and top-level input errors are returned to the caller.
//!
//! # Example
//!
//! ```rust
//! use pttcrawl_core::{CrawlerError, derive_aid};
//!
//! match derive_aid("https://www.ptt.cc/bbs/X/wrong.html") {
//!     Err(CrawlerError::InvalidUrl(url)) => println!("not an article: {}", url),
//!     Ok((board, aid)) => println!("{} {}", board, aid),
//!     Err(e) => println!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

/// Main error type for crawling and extraction operations.
#[derive(Error, Debug)]
pub enum CrawlerError {
    /// HTTP request errors from reqwest.
    ///
    /// This variant wraps network errors, DNS failures, connection issues,
    /// and other transport-level problems.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    ///
    /// Returned when an HTTP request exceeds the configured timeout duration.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// The server answered with a non-success status.
    #[error("Request to {url} failed with status {status}")]
    Status { status: u16, url: String },

    /// URL does not have the shape of a board article URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTML parsing errors, usually an invalid CSS selector.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// File write errors.
    ///
    /// Wraps standard I/O errors for output files.
    #[error("Failed to write to file: {0}")]
    WriteError(#[from] std::io::Error),

    /// JSON (de)serialization errors for records and output documents.
    #[error("JSON serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid crawler or fetch configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl CrawlerError {
    /// Whether this error came from fetching a page rather than from the
    /// output sink or the caller's input.
    pub fn is_fetch_failure(&self) -> bool {
        match self {
            #[cfg(feature = "fetch")]
            CrawlerError::HttpError(_) => true,
            CrawlerError::Timeout { .. } | CrawlerError::Status { .. } => true,
            _ => false,
        }
    }
}

/// Result type alias for CrawlerError.
///
/// This is a convenience alias for `std::result::Result<T, CrawlerError>`.
pub type Result<T> = std::result::Result<T, CrawlerError>;
