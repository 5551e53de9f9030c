//! Fasting session record.
//!
//! A session is either `Active` (no end instant) or `Completed`. The only
//! transition is Active -> Completed via [`FastingSession::stop`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::progress::{Goal, Progress};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Active,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FastingSession {
    pub id: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub goal: Goal,
}

impl FastingSession {
    /// Begin a new active fast.
    pub fn start(start_time: DateTime<Utc>, goal: Goal) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            start_time,
            end_time: None,
            goal,
        }
    }

    pub fn state(&self) -> SessionState {
        match self.end_time {
            None => SessionState::Active,
            Some(_) => SessionState::Completed,
        }
    }

    pub fn is_active(&self) -> bool {
        self.end_time.is_none()
    }

    /// Record the end of the fast.
    ///
    /// # Errors
    /// Fails if the session is already completed or `end_time` precedes the start.
    pub fn stop(&mut self, end_time: DateTime<Utc>) -> Result<(), ValidationError> {
        if !self.is_active() {
            return Err(ValidationError::AlreadyCompleted {
                id: self.id.clone(),
            });
        }
        if end_time < self.start_time {
            return Err(ValidationError::InvalidTimeRange {
                start: self.start_time,
                end: end_time,
            });
        }
        self.end_time = Some(end_time);
        Ok(())
    }

    /// Progress at `now`; `now` is ignored once the session has ended.
    pub fn progress_at(&self, now: DateTime<Utc>) -> Progress {
        Progress::compute(self.start_time, self.end_time, self.goal, now)
    }
}
