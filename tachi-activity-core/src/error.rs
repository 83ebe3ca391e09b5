//! Error types for tachi-activity-core

use thiserror::Error;

/// Why a record was rejected while clumping or appending a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    /// A score without `time_achieved`
    MissingTimestamp,
    /// The record is newer than the one before it
    OutOfOrder,
    /// An appended page contains a record at or after the feed's cursor
    NotOlderThanCursor,
}

impl std::fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            MalformedReason::MissingTimestamp => "record has no timestamp",
            MalformedReason::OutOfOrder => "record is newer than its predecessor",
            MalformedReason::NotOlderThanCursor => "record is not older than the page cursor",
        };
        f.write_str(msg)
    }
}

/// Main error type for the tachi-activity-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Input violated the record ordering/shape precondition
    #[error("malformed activity record at index {index}: {reason}")]
    MalformedRecord { index: usize, reason: MalformedReason },

    /// Pagination requested on a feed with no trailing timestamp
    #[error("no pagination cursor available")]
    NoCursorAvailable,

    /// Network failure talking to the activity API
    #[error("HTTP error: {0}")]
    Http(String),

    /// The API answered but reported a failure
    #[error("API error ({status}): {description}")]
    Api { status: u16, description: String },

    /// The API response body could not be decoded
    #[error("decode error: {0}")]
    Decode(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for tachi-activity-core
pub type Result<T> = std::result::Result<T, Error>;
