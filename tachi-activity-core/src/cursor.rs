//! Pagination cursors
//!
//! The next page is requested with the timestamp of the oldest record already
//! on screen as an exclusive upper bound. For a scores clump that is its last
//! score, not the clump's display time.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::types::Clump;

/// Timestamp boundary for requesting older activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cursor(DateTime<Utc>);

impl Cursor {
    pub fn new(time: DateTime<Utc>) -> Self {
        Self(time)
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.0
    }

    /// Value for the `startTime` query parameter.
    pub fn as_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }
}

impl From<DateTime<Utc>> for Cursor {
    fn from(time: DateTime<Utc>) -> Self {
        Self(time)
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_millis())
    }
}

/// Timestamp of the last record of the last clump.
pub fn next_cursor(clumps: &[Clump]) -> Result<DateTime<Utc>> {
    clumps
        .last()
        .and_then(Clump::oldest_timestamp)
        .ok_or(Error::NoCursorAvailable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clump::fixtures::{achievement, at, score, session};
    use crate::clump::{clump_with, ClumpOptions};
    use crate::types::ScoresClump;
    use chrono::Duration;

    fn window(secs: i64) -> ClumpOptions {
        ClumpOptions::with_merge_window(Duration::seconds(secs))
    }

    #[test]
    fn test_cursor_uses_oldest_score_of_last_clump() {
        let records = vec![session(1, 500), score(1, 300), score(1, 280), score(1, 250)];
        let clumps = clump_with(&records, window(60)).unwrap();

        assert_eq!(next_cursor(&clumps).unwrap(), at(250));
    }

    #[test]
    fn test_cursor_for_session_uses_start() {
        let clumps = clump_with(&[score(1, 900), session(2, 400)], window(60)).unwrap();
        assert_eq!(next_cursor(&clumps).unwrap(), at(400));
    }

    #[test]
    fn test_cursor_for_achievement() {
        let clumps = clump_with(&[achievement(1, 42)], window(60)).unwrap();
        assert_eq!(next_cursor(&clumps).unwrap(), at(42));
    }

    #[test]
    fn test_no_cursor_for_empty_feed() {
        assert!(matches!(next_cursor(&[]), Err(Error::NoCursorAvailable)));
    }

    #[test]
    fn test_no_cursor_for_empty_scores_clump() {
        let clump = Clump::Scores(ScoresClump {
            user_id: 1,
            scores: Vec::new(),
        });
        assert!(matches!(next_cursor(&[clump]), Err(Error::NoCursorAvailable)));
    }

    #[test]
    fn test_cursor_millis() {
        let cursor = Cursor::from(at(1_700_000_000));
        assert_eq!(cursor.as_millis(), 1_700_000_000_000);
        assert_eq!(cursor.to_string(), "1700000000000");
    }
}
