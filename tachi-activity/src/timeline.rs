//! Plain-text rendering of an activity feed.

use chrono::{DateTime, Utc};
use tachi_activity_core::format::{
    format_relative_time, format_time, scores_detail, scores_subtitle, session_description,
    session_is_probably_active,
};
use tachi_activity_core::{ActivityFeed, ClassAchievementRecord, Clump, SessionRecord};

/// Render every clump of the feed, one entry per block.
pub fn render(feed: &ActivityFeed, now: DateTime<Utc>) -> String {
    let mut out = String::new();

    for clump in feed.clumps() {
        let name = match feed.user_for(clump) {
            Some(user) => user.username.clone(),
            None => format!("user #{}", clump.user_id()),
        };

        let (headline, detail) = match clump {
            Clump::Scores(scores) => (
                format!("{} highlighted {}!", name, scores_subtitle(scores)),
                scores_detail(scores),
            ),
            Clump::Session(session) => session_lines(&name, session, now),
            Clump::ClassAchievement(achievement) => (achievement_line(&name, achievement), None),
        };

        let when = clump
            .timestamp()
            .map(|ts| format!("{} ({})", format_relative_time(ts, now), format_time(ts)))
            .unwrap_or_default();

        out.push_str(&format!("* {}  {}\n", headline, when));
        if let Some(detail) = detail {
            out.push_str(&format!("    {}\n", detail));
        }
    }

    out
}

fn session_lines(
    name: &str,
    session: &SessionRecord,
    now: DateTime<Utc>,
) -> (String, Option<String>) {
    let verb = if session_is_probably_active(session, now) {
        "is having"
    } else {
        "had"
    };
    let noun = if session.score_count == 1 {
        "score"
    } else {
        "scores"
    };
    let mut headline = format!(
        "{} {} a session '{}' with {} {}.",
        name, verb, session.name, session.score_count, noun
    );
    if session.highlight {
        headline.push_str(" [highlight]");
    }
    (headline, session_description(session).map(str::to_string))
}

fn achievement_line(name: &str, achievement: &ClassAchievementRecord) -> String {
    let mut line = format!(
        "{} achieved {} {}",
        name, achievement.class_set, achievement.class_value
    );
    if let Some(old) = &achievement.class_old_value {
        line.push_str(&format!(" (raised from {})", old));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tachi_activity_core::{ActivityPage, ClumpOptions};

    fn page() -> ActivityPage {
        serde_json::from_str(
            r#"{
            "records": [
                {"type": "SCORE", "scoreID": "R1", "userID": 1, "game": "iidx", "playtype": "SP",
                 "timeAchieved": 1700000000000,
                 "chart": {"chartID": "c1", "songID": 1, "title": "Verflucht", "difficulty": "ANOTHER"},
                 "comment": "finally"},
                {"type": "SESSION", "sessionID": "Q1", "userID": 2, "game": "iidx", "playtype": "SP",
                 "name": "Warmup", "desc": "This session has no description.",
                 "timeStarted": 1699990000000, "timeEnded": 1699995000000, "scoreCount": 1},
                {"type": "CLASS_ACHIEVEMENT", "userID": 3, "game": "iidx", "playtype": "SP",
                 "classSet": "dan", "classValue": "KAIDEN", "classOldValue": "CHUUDEN",
                 "timeAchieved": 1699980000000}
            ],
            "users": [{"id": 1, "username": "zkldi"}, {"id": 2, "username": "percyqaz"}]
        }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_render_feed() {
        let feed = ActivityFeed::from_page(page(), ClumpOptions::default()).unwrap();
        let now = Utc.timestamp_opt(1_700_003_600, 0).unwrap();
        let text = render(&feed, now);

        assert!(text.contains("* zkldi highlighted a score on Verflucht [ANOTHER]!  1h ago"));
        assert!(text.contains("    \"finally\""));
        assert!(text.contains("percyqaz had a session 'Warmup' with 1 score."));
        assert!(!text.contains("no description"));
        assert!(text.contains("user #3 achieved dan KAIDEN (raised from CHUUDEN)"));
    }
}
