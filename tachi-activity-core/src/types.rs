//! Core domain types for tachi-activity
//!
//! These mirror the activity payloads served by the Tachi API. Field names on
//! the wire follow the backend (`userID`, `timeAchieved`, ...) and timestamps
//! are Unix epoch milliseconds.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Record** | One raw activity item: a score, a session or a class achievement |
//! | **Clump** | One timeline entry, possibly aggregating several score records |
//! | **Playtype** | The controller layout a game is played with (SP, DP, 7K, ...) |
//! | **Class** | A rank badge (dan, skill level) held per game and playtype |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Numeric user identifier assigned by the backend.
pub type UserId = u64;

// ============================================
// Users
// ============================================

/// The parts of a user document the timeline needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: UserId,
    pub username: String,
}

// ============================================
// Raw records
// ============================================

/// Which chart a score was set on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRef {
    #[serde(rename = "chartID")]
    pub chart_id: String,
    #[serde(rename = "songID")]
    pub song_id: u64,
    /// Song title, when the backend sent the related song
    #[serde(default)]
    pub title: Option<String>,
    /// Difficulty name, when the backend sent the related chart
    #[serde(default)]
    pub difficulty: Option<String>,
}

impl ChartRef {
    /// Human-readable chart name, e.g. "5.1.1. [ANOTHER]".
    pub fn display_name(&self) -> String {
        match (&self.title, &self.difficulty) {
            (Some(title), Some(diff)) => format!("{} [{}]", title, diff),
            (Some(title), None) => title.clone(),
            _ => format!("chart {}", self.chart_id),
        }
    }
}

/// A single score submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    #[serde(rename = "scoreID")]
    pub score_id: String,
    #[serde(rename = "userID")]
    pub user_id: UserId,
    pub game: String,
    pub playtype: String,
    /// When the score was set; the backend allows this to be unknown
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub time_achieved: Option<DateTime<Utc>>,
    pub chart: ChartRef,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub highlight: bool,
}

/// A play session summary. Ordered by when it started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    #[serde(rename = "sessionID")]
    pub session_id: String,
    #[serde(rename = "userID")]
    pub user_id: UserId,
    pub game: String,
    pub playtype: String,
    pub name: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub time_started: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub time_ended: DateTime<Utc>,
    pub score_count: u32,
    #[serde(default)]
    pub highlight: bool,
}

/// A user reaching a new class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassAchievementRecord {
    #[serde(rename = "userID")]
    pub user_id: UserId,
    pub game: String,
    pub playtype: String,
    pub class_set: String,
    pub class_value: String,
    /// The class held before, or `None` if this is the first one
    #[serde(default)]
    pub class_old_value: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub time_achieved: DateTime<Utc>,
}

impl ClassAchievementRecord {
    /// Whether this raised an existing class rather than setting the first one.
    pub fn is_raise(&self) -> bool {
        self.class_old_value.is_some()
    }
}

/// Kind of activity, shared by records and clumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    Scores,
    Session,
    ClassAchievement,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Scores => "scores",
            ActivityKind::Session => "session",
            ActivityKind::ClassAchievement => "class_achievement",
        }
    }
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One raw activity item as served by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityRecord {
    Score(ScoreRecord),
    Session(SessionRecord),
    ClassAchievement(ClassAchievementRecord),
}

impl ActivityRecord {
    pub fn user_id(&self) -> UserId {
        match self {
            ActivityRecord::Score(s) => s.user_id,
            ActivityRecord::Session(s) => s.user_id,
            ActivityRecord::ClassAchievement(c) => c.user_id,
        }
    }

    /// The timestamp the timeline is ordered by.
    ///
    /// Sessions order by `time_started`, never `time_ended`.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            ActivityRecord::Score(s) => s.time_achieved,
            ActivityRecord::Session(s) => Some(s.time_started),
            ActivityRecord::ClassAchievement(c) => Some(c.time_achieved),
        }
    }

    pub fn kind(&self) -> ActivityKind {
        match self {
            ActivityRecord::Score(_) => ActivityKind::Scores,
            ActivityRecord::Session(_) => ActivityKind::Session,
            ActivityRecord::ClassAchievement(_) => ActivityKind::ClassAchievement,
        }
    }
}

// ============================================
// Clumps
// ============================================

/// Consecutive scores from one user, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoresClump {
    #[serde(rename = "userID")]
    pub user_id: UserId,
    pub scores: Vec<ScoreRecord>,
}

impl ScoresClump {
    /// Newest score in the clump.
    pub fn first(&self) -> Option<&ScoreRecord> {
        self.scores.first()
    }

    /// Oldest score in the clump.
    pub fn last(&self) -> Option<&ScoreRecord> {
        self.scores.last()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// A display-ready timeline entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Clump {
    Scores(ScoresClump),
    Session(SessionRecord),
    ClassAchievement(ClassAchievementRecord),
}

impl Clump {
    pub fn user_id(&self) -> UserId {
        match self {
            Clump::Scores(c) => c.user_id,
            Clump::Session(s) => s.user_id,
            Clump::ClassAchievement(c) => c.user_id,
        }
    }

    pub fn kind(&self) -> ActivityKind {
        match self {
            Clump::Scores(_) => ActivityKind::Scores,
            Clump::Session(_) => ActivityKind::Session,
            Clump::ClassAchievement(_) => ActivityKind::ClassAchievement,
        }
    }

    /// Display time of the entry: its newest underlying record.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Clump::Scores(c) => c.first().and_then(|s| s.time_achieved),
            Clump::Session(s) => Some(s.time_started),
            Clump::ClassAchievement(c) => Some(c.time_achieved),
        }
    }

    /// Timestamp of the oldest underlying record.
    pub fn oldest_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Clump::Scores(c) => c.last().and_then(|s| s.time_achieved),
            Clump::Session(s) => Some(s.time_started),
            Clump::ClassAchievement(c) => Some(c.time_achieved),
        }
    }

    /// Number of raw records this entry stands for.
    pub fn record_count(&self) -> usize {
        match self {
            Clump::Scores(c) => c.len(),
            Clump::Session(_) | Clump::ClassAchievement(_) => 1,
        }
    }

    /// The raw records behind this entry, in timeline order.
    pub fn records(&self) -> Vec<ActivityRecord> {
        match self {
            Clump::Scores(c) => c.scores.iter().cloned().map(ActivityRecord::Score).collect(),
            Clump::Session(s) => vec![ActivityRecord::Session(s.clone())],
            Clump::ClassAchievement(c) => vec![ActivityRecord::ClassAchievement(c.clone())],
        }
    }
}

// ============================================
// Pages
// ============================================

/// One decoded page of activity from the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityPage {
    /// Records, newest first
    pub records: Vec<ActivityRecord>,
    /// Users referenced by the records
    #[serde(default)]
    pub users: Vec<UserRef>,
}

impl ActivityPage {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ms(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    #[test]
    fn test_decode_tagged_records() {
        let json = r#"[
            {"type": "SCORE", "scoreID": "R1", "userID": 1, "game": "iidx", "playtype": "SP",
             "timeAchieved": 1700000000000,
             "chart": {"chartID": "c1", "songID": 4, "title": "5.1.1.", "difficulty": "ANOTHER"},
             "comment": "nice"},
            {"type": "SESSION", "sessionID": "Q1", "userID": 1, "game": "iidx", "playtype": "SP",
             "name": "Evening", "timeStarted": 1690000000000, "timeEnded": 1690003600000,
             "scoreCount": 12, "highlight": true},
            {"type": "CLASS_ACHIEVEMENT", "userID": 2, "game": "iidx", "playtype": "SP",
             "classSet": "dan", "classValue": "KAIDEN", "classOldValue": null,
             "timeAchieved": 1680000000000}
        ]"#;

        let records: Vec<ActivityRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records.len(), 3);

        match &records[0] {
            ActivityRecord::Score(s) => {
                assert_eq!(s.time_achieved, Some(ms(1_700_000_000_000)));
                assert_eq!(s.chart.display_name(), "5.1.1. [ANOTHER]");
                assert_eq!(s.comment.as_deref(), Some("nice"));
                assert!(!s.highlight);
            }
            other => panic!("expected score, got {:?}", other),
        }
        assert_eq!(records[1].kind(), ActivityKind::Session);
        assert_eq!(records[1].timestamp(), Some(ms(1_690_000_000_000)));
        match &records[2] {
            ActivityRecord::ClassAchievement(c) => assert!(!c.is_raise()),
            other => panic!("expected class achievement, got {:?}", other),
        }
    }

    #[test]
    fn test_score_without_time_decodes_as_none() {
        let json = r#"{"type": "SCORE", "scoreID": "R2", "userID": 1, "game": "sdvx",
            "playtype": "Single", "timeAchieved": null,
            "chart": {"chartID": "c2", "songID": 9}}"#;
        let record: ActivityRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.timestamp(), None);
    }

    #[test]
    fn test_unknown_discriminant_is_rejected() {
        let json = r#"{"type": "GOAL", "userID": 1}"#;
        assert!(serde_json::from_str::<ActivityRecord>(json).is_err());
    }

    #[test]
    fn test_session_orders_by_start() {
        let session = SessionRecord {
            session_id: "Q1".to_string(),
            user_id: 1,
            game: "iidx".to_string(),
            playtype: "SP".to_string(),
            name: "Morning".to_string(),
            desc: None,
            time_started: ms(1_000),
            time_ended: ms(9_000),
            score_count: 3,
            highlight: false,
        };
        let clump = Clump::Session(session);
        assert_eq!(clump.timestamp(), Some(ms(1_000)));
        assert_eq!(clump.oldest_timestamp(), Some(ms(1_000)));
        assert_eq!(clump.record_count(), 1);
    }

    #[test]
    fn test_chart_display_name_fallback() {
        let chart = ChartRef {
            chart_id: "abc".to_string(),
            song_id: 1,
            title: None,
            difficulty: Some("HARD".to_string()),
        };
        assert_eq!(chart.display_name(), "chart abc");
    }
}
