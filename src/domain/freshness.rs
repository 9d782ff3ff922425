use std::fmt;
use std::time::Duration;

use serde::Serialize;
use time::OffsetDateTime;

/// Prices older than this get a warning badge.
pub const PRICE_STALENESS_WARNING: Duration = Duration::from_secs(60 * 60);
/// Prices older than this are flagged as unreliable.
pub const PRICE_STALENESS_ALERT: Duration = Duration::from_secs(90 * 60);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceFreshness {
    Fresh,
    Warning,
    Alert,
    Unknown,
}

impl PriceFreshness {
    pub fn classify(now: OffsetDateTime, last_updated: Option<OffsetDateTime>) -> Self {
        let Some(updated_at) = last_updated else {
            return Self::Unknown;
        };

        let age = data_age(now, updated_at);
        if age < PRICE_STALENESS_WARNING {
            Self::Fresh
        } else if age < PRICE_STALENESS_ALERT {
            Self::Warning
        } else {
            Self::Alert
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Fresh => "fresh",
            Self::Warning => "getting old",
            Self::Alert => "stale",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PriceFreshness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Age of data; timestamps in the future count as brand new.
pub fn data_age(now: OffsetDateTime, updated_at: OffsetDateTime) -> Duration {
    let elapsed = now - updated_at;
    if elapsed.is_negative() {
        return Duration::ZERO;
    }
    Duration::from_secs(elapsed.whole_seconds().max(0) as u64)
}

/// Compact human-readable age ("42s", "7m", "3h", "2d").
pub fn age_label(age: Duration) -> String {
    let secs = age.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86400 {
        format!("{}h", secs / 3600)
    } else {
        format!("{}d", secs / 86400)
    }
}
