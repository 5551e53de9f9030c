//! Serializable read projection of a fast at one sampled instant.
//!
//! This is what a presentation surface renders. All fields come from a
//! single [`Progress`] computed against a single `at`, so nothing in a
//! snapshot can disagree with anything else in it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::progress::{Goal, HoursMinutes, Progress};
use crate::session::{FastingSession, SessionState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotState {
    Idle,
    Active,
    Completed,
}

impl From<SessionState> for SnapshotState {
    fn from(state: SessionState) -> Self {
        match state {
            SessionState::Active => SnapshotState::Active,
            SessionState::Completed => SnapshotState::Completed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FastingSnapshot {
    pub state: SnapshotState,
    pub session_id: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub goal_minutes: Option<u32>,
    pub duration_secs: u64,
    pub elapsed: HoursMinutes,
    pub goal_met: bool,
    pub remaining_minutes: u64,
    pub remaining: HoursMinutes,
    pub progress_ratio: f64,
    /// Whole percentage of the goal, rounded down.
    pub percent: u8,
    pub projected_end_time: Option<DateTime<Utc>>,
    /// The sampled instant every other field was derived from.
    pub at: DateTime<Utc>,
}

impl FastingSnapshot {
    pub fn capture(session: &FastingSession, at: DateTime<Utc>) -> Self {
        let progress = session.progress_at(at);
        Self {
            state: session.state().into(),
            session_id: Some(session.id.clone()),
            start_time: Some(session.start_time),
            end_time: session.end_time,
            goal_minutes: session.goal.minutes(),
            duration_secs: progress.duration_secs,
            elapsed: progress.elapsed_hours_and_minutes(),
            goal_met: progress.goal_met,
            remaining_minutes: progress.remaining_minutes,
            remaining: progress.remaining_hours_and_minutes(),
            progress_ratio: progress.progress_ratio,
            percent: progress.percent(),
            projected_end_time: progress.projected_end_time,
            at,
        }
    }

    /// Snapshot for "no fast running".
    pub fn idle(at: DateTime<Utc>) -> Self {
        let neutral = Progress::compute(at, Some(at), Goal::None, at);
        Self {
            state: SnapshotState::Idle,
            session_id: None,
            start_time: None,
            end_time: None,
            goal_minutes: None,
            duration_secs: neutral.duration_secs,
            elapsed: neutral.elapsed_hours_and_minutes(),
            goal_met: false,
            remaining_minutes: 0,
            remaining: neutral.remaining_hours_and_minutes(),
            progress_ratio: 0.0,
            percent: neutral.percent(),
            projected_end_time: None,
            at,
        }
    }

    /// Capture the active session if any, otherwise an idle snapshot.
    pub fn of(session: Option<&FastingSession>, at: DateTime<Utc>) -> Self {
        session.map_or_else(|| Self::idle(at), |s| Self::capture(s, at))
    }

    /// One-line human summary used by the terminal surface.
    pub fn summary(&self) -> String {
        self.summary_opts(false)
    }

    /// Like [`FastingSnapshot::summary`], optionally with elapsed seconds.
    pub fn summary_opts(&self, show_seconds: bool) -> String {
        let elapsed = if show_seconds {
            format!("{} {:02}s", self.elapsed, self.duration_secs % 60)
        } else {
            self.elapsed.to_string()
        };
        match self.state {
            SnapshotState::Idle => "Not fasting".to_string(),
            SnapshotState::Active | SnapshotState::Completed => {
                let verb = if self.state == SnapshotState::Active {
                    "Fasting"
                } else {
                    "Fasted"
                };
                match self.goal_minutes {
                    None => format!("{verb} {elapsed} (no goal)"),
                    Some(_) if self.goal_met => format!("{verb} {elapsed} - goal reached"),
                    Some(_) => format!(
                        "{verb} {elapsed} - {} to go ({}%)",
                        self.remaining, self.percent
                    ),
                }
            }
        }
    }
}
