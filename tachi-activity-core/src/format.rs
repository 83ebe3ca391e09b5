//! Formatting helpers for timeline entries.

use chrono::{DateTime, Duration, Utc};

use crate::types::{ScoresClump, SessionRecord};

/// Placeholder the backend stores for sessions nobody described.
const NO_DESCRIPTION: &str = "This session has no description.";

/// Longest chart list shown under a multi-score entry.
pub const CHART_LIST_LIMIT: usize = 100;

/// Format a timestamp as relative time (e.g., "2m ago").
pub fn format_relative_time(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(ts);

    if duration.num_seconds() < 0 {
        "just now".to_string()
    } else if duration.num_seconds() < 60 {
        format!("{}s ago", duration.num_seconds())
    } else if duration.num_minutes() < 60 {
        format!("{}m ago", duration.num_minutes())
    } else if duration.num_hours() < 24 {
        format!("{}h ago", duration.num_hours())
    } else if duration.num_days() < 7 {
        format!("{}d ago", duration.num_days())
    } else {
        ts.format("%b %d").to_string()
    }
}

/// Format a timestamp as an absolute UTC time.
pub fn format_time(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Cut a string to at most `max` characters, ending in "..." when cut.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// What a scores entry says after "<user> highlighted".
pub fn scores_subtitle(clump: &ScoresClump) -> String {
    match clump.scores.as_slice() {
        [only] => format!("a score on {}", only.chart.display_name()),
        scores => format!("{} scores", scores.len()),
    }
}

/// The muted line under a scores entry: the comment of a lone score, or the
/// list of charts played.
pub fn scores_detail(clump: &ScoresClump) -> Option<String> {
    match clump.scores.as_slice() {
        [] => None,
        [only] => only.comment.as_ref().map(|c| format!("\"{}\"", c)),
        scores => {
            let charts: Vec<String> = scores.iter().map(|s| s.chart.display_name()).collect();
            Some(truncate(&charts.join(", "), CHART_LIST_LIMIT))
        }
    }
}

/// A session that ended less than an hour ago is probably still going.
pub fn session_is_probably_active(session: &SessionRecord, now: DateTime<Utc>) -> bool {
    now - session.time_ended < Duration::hours(1)
}

/// The session description, hiding the backend's placeholder.
pub fn session_description(session: &SessionRecord) -> Option<&str> {
    session
        .desc
        .as_deref()
        .filter(|d| !d.is_empty() && *d != NO_DESCRIPTION)
}
