//! # tachi-activity-core
//!
//! Core library for tachi-activity - the activity timeline of a Tachi score
//! tracker.
//!
//! This library provides:
//! - Domain types for score, session and class achievement records
//! - Clumping of raw records into timeline entries
//! - Pagination cursors and an append-only [`ActivityFeed`]
//! - An HTTP client for the activity API
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Example
//!
//! ```rust,no_run
//! use tachi_activity_core::{clump, next_cursor, ActivityPage};
//!
//! let page: ActivityPage = serde_json::from_str("{\"records\": []}").unwrap();
//! let clumps = clump(&page.records).expect("records are newest first");
//! if !clumps.is_empty() {
//!     let cursor = next_cursor(&clumps).expect("clumps have timestamps");
//!     println!("next page starts before {}", cursor);
//! }
//! ```

// Re-export commonly used items at the crate root
pub use client::{ActivityClient, ActivityScope};
pub use clump::{clump, clump_with, flatten, ClumpOptions, MERGE_WINDOW};
pub use config::Config;
pub use cursor::{next_cursor, Cursor};
pub use error::{Error, MalformedReason, Result};
pub use feed::ActivityFeed;
pub use types::*;

// Public modules
pub mod client;
pub mod clump;
pub mod config;
pub mod cursor;
pub mod error;
pub mod feed;
pub mod format;
pub mod logging;
pub mod types;
