//! Activity clumping
//!
//! Turns a newest-first stream of raw activity records into timeline entries.
//! Consecutive scores from the same user are folded into one [`ScoresClump`]
//! while each gap between neighbouring scores stays within the merge window.
//! The window chains: every score is compared with the previously appended one,
//! not with the first score of the clump, so a clump can cover a longer span
//! than the window itself.
//!
//! Sessions and class achievements always stand alone and break any score run
//! in progress.
//!
//! The input must already be sorted newest first. Nothing here re-sorts; a
//! record that is newer than its predecessor is rejected with
//! [`MalformedReason::OutOfOrder`] so that misordered pages are never glued
//! onto a feed.

use chrono::{DateTime, Duration, Utc};

use crate::error::{Error, MalformedReason, Result};
use crate::types::{ActivityRecord, Clump, ScoreRecord, ScoresClump, UserId};

/// Default maximum gap between two scores of the same clump.
pub const MERGE_WINDOW: Duration = Duration::hours(1);

/// Tunables for [`clump_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClumpOptions {
    /// Largest gap (inclusive) between consecutive same-user scores
    pub merge_window: Duration,
}

impl Default for ClumpOptions {
    fn default() -> Self {
        Self {
            merge_window: MERGE_WINDOW,
        }
    }
}

impl ClumpOptions {
    /// Options with a custom window. A negative window is clamped to zero, so
    /// same-user scores with identical timestamps still merge.
    pub fn with_merge_window(merge_window: Duration) -> Self {
        Self {
            merge_window: merge_window.max(Duration::zero()),
        }
    }

    /// Options from a window length in seconds.
    ///
    /// Returns `None` unless `secs` is positive and fits in a [`Duration`].
    pub fn from_secs(secs: i64) -> Option<Self> {
        if secs <= 0 {
            return None;
        }
        Duration::try_seconds(secs).map(Self::with_merge_window)
    }
}

/// Scores waiting to be emitted as one clump.
struct PendingScores {
    user_id: UserId,
    last_time: DateTime<Utc>,
    scores: Vec<ScoreRecord>,
}

impl PendingScores {
    fn start(score: ScoreRecord, time: DateTime<Utc>) -> Self {
        Self {
            user_id: score.user_id,
            last_time: time,
            scores: vec![score],
        }
    }

    fn accepts(&self, score: &ScoreRecord, time: DateTime<Utc>, window: Duration) -> bool {
        self.user_id == score.user_id && self.last_time - time <= window
    }

    fn push(&mut self, score: ScoreRecord, time: DateTime<Utc>) {
        self.last_time = time;
        self.scores.push(score);
    }

    fn finish(self) -> Clump {
        Clump::Scores(ScoresClump {
            user_id: self.user_id,
            scores: self.scores,
        })
    }
}

/// Clump records using the default one hour merge window.
pub fn clump(records: &[ActivityRecord]) -> Result<Vec<Clump>> {
    clump_with(records, ClumpOptions::default())
}

/// Clump records with explicit options.
///
/// Fails with [`Error::MalformedRecord`] on the first record that has no
/// ordering timestamp or is newer than the record before it. No clumps are
/// returned in that case.
pub fn clump_with(records: &[ActivityRecord], options: ClumpOptions) -> Result<Vec<Clump>> {
    let mut clumps = Vec::new();
    let mut pending: Option<PendingScores> = None;
    let mut previous: Option<DateTime<Utc>> = None;

    for (index, record) in records.iter().enumerate() {
        let time = ordering_time(index, record, previous)?;
        previous = Some(time);

        match record {
            ActivityRecord::Score(score) => {
                let extends = pending
                    .as_ref()
                    .is_some_and(|run| run.accepts(score, time, options.merge_window));

                if extends {
                    if let Some(run) = pending.as_mut() {
                        run.push(score.clone(), time);
                    }
                } else if let Some(run) = pending.replace(PendingScores::start(score.clone(), time))
                {
                    clumps.push(run.finish());
                }
            }
            ActivityRecord::Session(session) => {
                if let Some(run) = pending.take() {
                    clumps.push(run.finish());
                }
                clumps.push(Clump::Session(session.clone()));
            }
            ActivityRecord::ClassAchievement(achievement) => {
                if let Some(run) = pending.take() {
                    clumps.push(run.finish());
                }
                clumps.push(Clump::ClassAchievement(achievement.clone()));
            }
        }
    }

    if let Some(run) = pending {
        clumps.push(run.finish());
    }

    tracing::debug!(
        records = records.len(),
        clumps = clumps.len(),
        merge_window_secs = options.merge_window.num_seconds(),
        "Clumped activity"
    );

    Ok(clumps)
}

/// Check the precondition for one record and return its ordering timestamp.
fn ordering_time(
    index: usize,
    record: &ActivityRecord,
    previous: Option<DateTime<Utc>>,
) -> Result<DateTime<Utc>> {
    let time = record.timestamp().ok_or(Error::MalformedRecord {
        index,
        reason: MalformedReason::MissingTimestamp,
    })?;

    if matches!(previous, Some(prev) if time > prev) {
        return Err(Error::MalformedRecord {
            index,
            reason: MalformedReason::OutOfOrder,
        });
    }

    Ok(time)
}

/// Flatten clumps back into the raw records they were built from.
pub fn flatten(clumps: &[Clump]) -> Vec<ActivityRecord> {
    clumps.iter().flat_map(Clump::records).collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Record builders shared by the unit tests.

    use chrono::{DateTime, TimeZone, Utc};

    use crate::types::{
        ActivityRecord, ChartRef, ClassAchievementRecord, ScoreRecord, SessionRecord, UserId,
    };

    pub fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    pub fn score(user_id: UserId, secs: i64) -> ActivityRecord {
        ActivityRecord::Score(ScoreRecord {
            score_id: format!("R{}-{}", user_id, secs),
            user_id,
            game: "iidx".to_string(),
            playtype: "SP".to_string(),
            time_achieved: Some(at(secs)),
            chart: ChartRef {
                chart_id: format!("chart-{}", secs),
                song_id: 1,
                title: Some("GAMBOL".to_string()),
                difficulty: Some("HYPER".to_string()),
            },
            comment: None,
            highlight: true,
        })
    }

    pub fn session(user_id: UserId, secs: i64) -> ActivityRecord {
        ActivityRecord::Session(SessionRecord {
            session_id: format!("Q{}-{}", user_id, secs),
            user_id,
            game: "iidx".to_string(),
            playtype: "SP".to_string(),
            name: "Session".to_string(),
            desc: None,
            time_started: at(secs),
            time_ended: at(secs + 600),
            score_count: 4,
            highlight: false,
        })
    }

    pub fn achievement(user_id: UserId, secs: i64) -> ActivityRecord {
        ActivityRecord::ClassAchievement(ClassAchievementRecord {
            user_id,
            game: "iidx".to_string(),
            playtype: "SP".to_string(),
            class_set: "dan".to_string(),
            class_value: "DAN_5".to_string(),
            class_old_value: Some("DAN_4".to_string()),
            time_achieved: at(secs),
        })
    }
}
