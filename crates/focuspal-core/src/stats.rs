//! Daily session counts and consecutive-day streaks.
//!
//! Pure calendar-day arithmetic over the host's local date; no timezone
//! negotiation beyond that. Updated exactly once per completed focus
//! session.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Persisted streak state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    /// Calendar date of the most recent focus completion.
    pub last_session_date: Option<NaiveDate>,
    /// Consecutive calendar days with at least one completed focus session.
    pub streak: u32,
    /// Focus sessions completed today; resets when the date changes.
    pub sessions_today: u32,
}

impl Default for DailyStats {
    fn default() -> Self {
        Self {
            last_session_date: None,
            streak: 0,
            sessions_today: 0,
        }
    }
}

/// Fold one focus-session completion on `today` into `stats`.
///
/// The streak increments when the previous completion was yesterday, holds
/// when it was already today, and resets to 1 after any longer gap.
pub fn record_completion(today: NaiveDate, stats: &DailyStats) -> DailyStats {
    let yesterday = today - Duration::days(1);
    let sessions_today = if stats.last_session_date == Some(today) {
        stats.sessions_today.saturating_add(1)
    } else {
        1
    };
    let streak = match stats.last_session_date {
        Some(date) if date == yesterday => stats.streak.max(1).saturating_add(1),
        Some(date) if date == today => stats.streak.max(1),
        _ => 1,
    };
    DailyStats {
        last_session_date: Some(today),
        streak,
        sessions_today,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn first_completion_starts_streak_at_one() {
        let updated = record_completion(day("2026-03-10"), &DailyStats::default());
        assert_eq!(updated.streak, 1);
        assert_eq!(updated.sessions_today, 1);
        assert_eq!(updated.last_session_date, Some(day("2026-03-10")));
    }

    #[test]
    fn yesterday_extends_the_streak() {
        let stats = DailyStats {
            last_session_date: Some(day("2026-03-09")),
            streak: 4,
            sessions_today: 3,
        };
        let updated = record_completion(day("2026-03-10"), &stats);
        assert_eq!(updated.streak, 5);
        assert_eq!(updated.sessions_today, 1, "new day restarts the count");
    }

    #[test]
    fn same_day_holds_streak_and_counts_session() {
        let stats = DailyStats {
            last_session_date: Some(day("2026-03-10")),
            streak: 5,
            sessions_today: 1,
        };
        let updated = record_completion(day("2026-03-10"), &stats);
        assert_eq!(updated.streak, 5);
        assert_eq!(updated.sessions_today, 2);
    }

    #[test]
    fn gap_of_more_than_one_day_resets() {
        let stats = DailyStats {
            last_session_date: Some(day("2026-03-01")),
            streak: 12,
            sessions_today: 6,
        };
        let updated = record_completion(day("2026-03-10"), &stats);
        assert_eq!(updated.streak, 1);
        assert_eq!(updated.sessions_today, 1);
    }

    #[test]
    fn month_boundary_still_counts_as_consecutive() {
        let stats = DailyStats {
            last_session_date: Some(day("2026-02-28")),
            streak: 2,
            sessions_today: 1,
        };
        let updated = record_completion(day("2026-03-01"), &stats);
        assert_eq!(updated.streak, 3);
    }
}
