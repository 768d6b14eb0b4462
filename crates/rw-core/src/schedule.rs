//! Page refresh scheduling.
//!
//! Pages reload themselves either on a fixed interval or at the next
//! occurrence of a wall-clock time in the page's time zone. The delay is
//! computed server-side and handed to a client-side timer.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ReportError, ReportResult};

/// A wall-clock time of day with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u32,
    minute: u32,
}

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> ReportResult<Self> {
        if hour > 23 || minute > 59 {
            return Err(ReportError::config(format!(
                "invalid time of day {:02}:{:02}",
                hour, minute
            )));
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    fn naive(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or_default()
    }
}

impl FromStr for TimeOfDay {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, m) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| ReportError::config(format!("expected HH:MM, got '{}'", s)))?;
        let hour = h
            .parse::<u32>()
            .map_err(|_| ReportError::config(format!("invalid hour in '{}'", s)))?;
        let minute = m
            .parse::<u32>()
            .map_err(|_| ReportError::config(format!("invalid minute in '{}'", s)))?;
        Self::new(hour, minute)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ReportError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Map a local wall-clock time to an instant.
///
/// Ambiguous times (clocks going back) take the earlier instant. Times that
/// fall in a gap (clocks going forward) are shifted forward by the gap.
fn resolve_local(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            let before = tz
                .offset_from_utc_datetime(&(naive - Duration::days(1)))
                .fix();
            let utc = naive - Duration::seconds(i64::from(before.local_minus_utc()));
            tz.from_utc_datetime(&utc)
        }
    }
}

/// Next occurrence of `at` strictly after `now`, in `now`'s time zone.
///
/// Today if the time is still ahead, otherwise the same wall-clock time
/// tomorrow.
pub fn next_occurrence(now: &DateTime<Tz>, at: TimeOfDay) -> DateTime<Tz> {
    let tz = now.timezone();
    let today = now.date_naive();

    let candidate = resolve_local(&tz, today.and_time(at.naive()));
    if candidate > *now {
        return candidate;
    }

    let tomorrow = today.succ_opt().unwrap_or(today);
    resolve_local(&tz, tomorrow.and_time(at.naive()))
}

/// Largest delay a browser timer honours; longer delays fire immediately.
pub const MAX_TIMER_DELAY_MS: u64 = i32::MAX as u64;

/// Longest interval whose delay still fits a browser timer (about 24.8 days).
pub const MAX_REFRESH_INTERVAL_SECS: u64 = MAX_TIMER_DELAY_MS / 1000;

/// Milliseconds from `now` until `next`, clamped at zero.
pub fn millis_until<A: TimeZone, B: TimeZone>(now: &DateTime<A>, next: &DateTime<B>) -> u64 {
    let delta = next.clone().with_timezone(&Utc) - now.clone().with_timezone(&Utc);
    delta.num_milliseconds().max(0) as u64
}

/// When a rendered page should reload itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RefreshPolicy {
    Off,
    Interval { every_secs: u64 },
    Daily { at: TimeOfDay },
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self::Daily {
            at: TimeOfDay {
                hour: 12,
                minute: 30,
            },
        }
    }
}

/// A computed reload deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshDelay {
    pub delay_ms: u64,
    pub at: DateTime<Tz>,
}

impl RefreshPolicy {
    /// Compute the reload delay for a page rendered at `now`.
    pub fn reload_delay(&self, now: DateTime<Utc>, tz: Tz) -> Option<RefreshDelay> {
        let local = now.with_timezone(&tz);
        match self {
            RefreshPolicy::Off => None,
            RefreshPolicy::Interval { every_secs } => {
                let every_secs = (*every_secs).min(MAX_REFRESH_INTERVAL_SECS);
                Some(RefreshDelay {
                    delay_ms: every_secs * 1000,
                    at: local + Duration::seconds(every_secs as i64),
                })
            }
            RefreshPolicy::Daily { at } => {
                let next = next_occurrence(&local, *at);
                Some(RefreshDelay {
                    delay_ms: millis_until(&local, &next),
                    at: next,
                })
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            RefreshPolicy::Off => "off".to_string(),
            RefreshPolicy::Interval { every_secs } => format!("every {}s", every_secs),
            RefreshPolicy::Daily { at } => format!("daily at {}", at),
        }
    }
}
