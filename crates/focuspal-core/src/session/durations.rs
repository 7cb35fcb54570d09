use serde::{Deserialize, Serialize};

use super::machine::SessionKind;

pub const DEFAULT_FOCUS_MIN: u32 = 25;
pub const DEFAULT_BREAK_MIN: u32 = 5;

/// Configured interval lengths in minutes.
///
/// Owned by the external settings editor and re-read from the store at
/// session reset and settings-change time; never cached beyond one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Durations {
    pub focus_min: u32,
    pub break_min: u32,
}

impl Durations {
    /// Build from raw store values, defaulting 25/5 for anything missing,
    /// non-numeric, or non-positive.
    pub fn from_store_values(focus: Option<&str>, brk: Option<&str>) -> Self {
        Self {
            focus_min: parse_minutes(focus, DEFAULT_FOCUS_MIN),
            break_min: parse_minutes(brk, DEFAULT_BREAK_MIN),
        }
    }

    /// Full duration of a session of `kind`, in seconds.
    ///
    /// Uses saturating arithmetic to prevent overflow with large values.
    pub fn secs_for(&self, kind: SessionKind) -> u32 {
        match kind {
            SessionKind::Focus => self.focus_min.saturating_mul(60),
            SessionKind::Break => self.break_min.saturating_mul(60),
        }
    }
}

impl Default for Durations {
    fn default() -> Self {
        Self {
            focus_min: DEFAULT_FOCUS_MIN,
            break_min: DEFAULT_BREAK_MIN,
        }
    }
}

fn parse_minutes(raw: Option<&str>, default: u32) -> u32 {
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|&minutes| minutes > 0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_25_and_5() {
        let d = Durations::default();
        assert_eq!(d.secs_for(SessionKind::Focus), 25 * 60);
        assert_eq!(d.secs_for(SessionKind::Break), 5 * 60);
    }

    #[test]
    fn parses_store_values() {
        let d = Durations::from_store_values(Some("50"), Some("10"));
        assert_eq!(d.focus_min, 50);
        assert_eq!(d.break_min, 10);
    }

    #[test]
    fn malformed_values_fall_back_to_defaults() {
        let d = Durations::from_store_values(Some("soon"), None);
        assert_eq!(d.focus_min, DEFAULT_FOCUS_MIN);
        assert_eq!(d.break_min, DEFAULT_BREAK_MIN);
    }

    #[test]
    fn zero_minutes_is_rejected() {
        let d = Durations::from_store_values(Some("0"), Some("0"));
        assert_eq!(d.focus_min, DEFAULT_FOCUS_MIN);
        assert_eq!(d.break_min, DEFAULT_BREAK_MIN);
    }

    #[test]
    fn whitespace_is_tolerated() {
        let d = Durations::from_store_values(Some(" 30 "), Some("7"));
        assert_eq!(d.focus_min, 30);
        assert_eq!(d.break_min, 7);
    }
}
