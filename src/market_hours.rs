//! Trading-window gate evaluated in the exchange's local time.

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use serde::Deserialize;

/// Local trading window. Hours are whole hours, `start_hour` inclusive and
/// `end_hour` exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MarketHours {
    /// When `false` every instant counts as inside the window.
    pub enabled: bool,
    pub tz: Tz,
    pub start_hour: u32,
    pub end_hour: u32,
    pub days_mon_to_fri_only: bool,
}

impl Default for MarketHours {
    fn default() -> Self {
        Self {
            enabled: true,
            tz: chrono_tz::Europe::Berlin,
            start_hour: 8,
            end_hour: 22,
            days_mon_to_fri_only: true,
        }
    }
}

impl MarketHours {
    /// Whether `now` falls inside the window.
    #[must_use]
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        if !self.enabled {
            return true;
        }
        let local = now.with_timezone(&self.tz);
        if self.days_mon_to_fri_only && matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
            return false;
        }
        (self.start_hour..self.end_hour).contains(&local.hour())
    }

    /// Local wall-clock time for log lines.
    #[must_use]
    pub fn local_timestamp(&self, now: DateTime<Utc>) -> String {
        now.with_timezone(&self.tz)
            .format("%Y-%m-%d %H:%M:%S %Z")
            .to_string()
    }
}
