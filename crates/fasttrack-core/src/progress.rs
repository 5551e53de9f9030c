//! Fasting progress model.
//!
//! A pure derivation from a session's start instant, optional end instant,
//! optional goal and a caller-sampled `now`. Every surface (CLI status line,
//! watch loop, JSON snapshot) goes through [`Progress::compute`] so they all
//! agree on what "met", "remaining" and "progress" mean.
//!
//! Whole-minute floor semantics drive `goal_met` and `remaining_minutes`,
//! while `progress_ratio` uses fractional minutes. A progress bar therefore
//! moves every second but the goal only flips on a minute boundary.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Target fasting duration.
///
/// `None` and `Minutes(0)` are different things: no goal yields neutral
/// outputs, a zero goal is met immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    #[default]
    None,
    Minutes(u32),
}

impl Goal {
    /// Build a goal from a nullable stored integer.
    ///
    /// Negative values clamp to a zero-minute goal, oversized ones to `u32::MAX`.
    pub fn from_raw(raw: Option<i64>) -> Self {
        match raw {
            None => Goal::None,
            Some(m) => Goal::Minutes(m.clamp(0, i64::from(u32::MAX)) as u32),
        }
    }

    pub fn minutes(self) -> Option<u32> {
        match self {
            Goal::None => None,
            Goal::Minutes(m) => Some(m),
        }
    }

    pub fn is_set(self) -> bool {
        matches!(self, Goal::Minutes(_))
    }
}

impl From<Option<u32>> for Goal {
    fn from(value: Option<u32>) -> Self {
        value.map_or(Goal::None, Goal::Minutes)
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Goal::None => f.write_str("none"),
            Goal::Minutes(m) => write!(f, "{}", HoursMinutes::from_minutes(u64::from(*m))),
        }
    }
}

impl FromStr for Goal {
    type Err = ValidationError;

    /// Accepts `none`, bare minutes (`960`), `16h`, `90m`, `16h30m` and `16:30`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim().to_ascii_lowercase();
        let invalid = || ValidationError::InvalidValue {
            field: "goal".into(),
            message: format!("cannot parse '{s}' as a goal (try 16h, 90m, 16:30 or none)"),
        };

        if raw.is_empty() {
            return Err(invalid());
        }
        if raw == "none" || raw == "off" {
            return Ok(Goal::None);
        }

        if let Some((h, m)) = raw.split_once(':') {
            let hours: u32 = h.parse().map_err(|_| invalid())?;
            let minutes: u32 = m.parse().map_err(|_| invalid())?;
            if minutes >= 60 {
                return Err(invalid());
            }
            return hours
                .checked_mul(60)
                .and_then(|h| h.checked_add(minutes))
                .map(Goal::Minutes)
                .ok_or_else(invalid);
        }

        if let Ok(minutes) = raw.parse::<u32>() {
            return Ok(Goal::Minutes(minutes));
        }

        let (hours_part, rest) = match raw.split_once('h') {
            Some((h, rest)) => (Some(h), rest),
            None => (None, raw.as_str()),
        };
        let hours: u32 = match hours_part {
            Some(h) => h.parse().map_err(|_| invalid())?,
            None => 0,
        };
        let minutes: u32 = match rest.strip_suffix('m') {
            Some(m) => m.parse().map_err(|_| invalid())?,
            None if rest.is_empty() && hours_part.is_some() => 0,
            None => return Err(invalid()),
        };
        if hours_part.is_some() && minutes >= 60 {
            return Err(invalid());
        }
        hours
            .checked_mul(60)
            .and_then(|h| h.checked_add(minutes))
            .map(Goal::Minutes)
            .ok_or_else(invalid)
    }
}

/// An (hours, minutes) pair produced by integer decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoursMinutes {
    pub hours: u64,
    pub minutes: u64,
}

impl HoursMinutes {
    pub fn from_minutes(total: u64) -> Self {
        Self {
            hours: total / 60,
            minutes: total % 60,
        }
    }
}

impl fmt::Display for HoursMinutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h {:02}m", self.hours, self.minutes)
    }
}

/// Derived state of a fast at one sampled instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// Elapsed whole seconds, never negative.
    pub duration_secs: u64,
    pub goal_met: bool,
    pub remaining_minutes: u64,
    /// Fraction of the goal completed, in `[0, 1]`.
    pub progress_ratio: f64,
    /// Originally targeted end, independent of when the fast actually stopped.
    pub projected_end_time: Option<DateTime<Utc>>,
}

impl Progress {
    /// Derive progress for a session.
    ///
    /// `now` is only consulted when `end_time` is `None`. Callers must sample
    /// the clock once and pass the same instant for everything they render.
    pub fn compute(
        start_time: DateTime<Utc>,
        end_time: Option<DateTime<Utc>>,
        goal: Goal,
        now: DateTime<Utc>,
    ) -> Self {
        let until = end_time.unwrap_or(now);
        let duration_secs = u64::try_from((until - start_time).num_seconds()).unwrap_or(0);
        let elapsed_minutes = duration_secs / 60;

        match goal {
            Goal::None => Self {
                duration_secs,
                goal_met: false,
                remaining_minutes: 0,
                progress_ratio: 0.0,
                projected_end_time: None,
            },
            Goal::Minutes(g) => {
                let g = u64::from(g);
                let progress_ratio = if g == 0 {
                    0.0
                } else {
                    ((duration_secs as f64 / 60.0) / g as f64).min(1.0)
                };
                Self {
                    duration_secs,
                    goal_met: elapsed_minutes >= g,
                    remaining_minutes: g.saturating_sub(elapsed_minutes),
                    progress_ratio,
                    projected_end_time: start_time
                        .checked_add_signed(Duration::minutes(g as i64)),
                }
            }
        }
    }

    pub fn elapsed_hours_and_minutes(&self) -> HoursMinutes {
        HoursMinutes {
            hours: self.duration_secs / 3600,
            minutes: (self.duration_secs / 60) % 60,
        }
    }

    pub fn remaining_hours_and_minutes(&self) -> HoursMinutes {
        HoursMinutes::from_minutes(self.remaining_minutes)
    }

    /// Progress as a whole percentage, rounded down.
    pub fn percent(&self) -> u8 {
        (self.progress_ratio * 100.0).floor() as u8
    }
}
