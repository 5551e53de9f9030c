use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::progress::{Goal, Progress};
use crate::snapshot::FastingSnapshot;

/// Every state change in the system produces an Event.
/// The CLI prints them as JSON; other surfaces can consume the same shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    FastStarted {
        session_id: String,
        goal: Goal,
        at: DateTime<Utc>,
    },
    FastStopped {
        session_id: String,
        duration_secs: u64,
        goal_met: bool,
        at: DateTime<Utc>,
    },
    GoalChanged {
        session_id: String,
        from: Goal,
        to: Goal,
        at: DateTime<Utc>,
    },
    /// The whole-minute goal boundary was crossed while watching.
    GoalReached {
        session_id: String,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    FastDeleted {
        session_id: String,
        at: DateTime<Utc>,
    },
    StateSnapshot(FastingSnapshot),
}

impl Event {
    /// `GoalReached` if `goal_met` flipped from false to true between two samples.
    pub fn goal_crossing(
        session_id: &str,
        prev: &Progress,
        next: &Progress,
        at: DateTime<Utc>,
    ) -> Option<Event> {
        if !prev.goal_met && next.goal_met {
            Some(Event::GoalReached {
                session_id: session_id.to_string(),
                duration_secs: next.duration_secs,
                at,
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 20, 0, 0).unwrap()
    }

    #[test]
    fn goal_crossing_fires_once_on_minute_boundary() {
        let goal = Goal::Minutes(1);
        let samples: Vec<Progress> = [58, 59, 60, 61]
            .iter()
            .map(|s| Progress::compute(t0(), None, goal, t0() + Duration::seconds(*s)))
            .collect();

        let fired: Vec<_> = samples
            .windows(2)
            .filter_map(|w| Event::goal_crossing("s1", &w[0], &w[1], t0()))
            .collect();
        assert_eq!(fired.len(), 1);
        assert!(matches!(
            fired[0],
            Event::GoalReached { duration_secs: 60, .. }
        ));
    }

    #[test]
    fn no_goal_never_crosses() {
        let a = Progress::compute(t0(), None, Goal::None, t0());
        let b = Progress::compute(t0(), None, Goal::None, t0() + Duration::days(1));
        assert!(Event::goal_crossing("s1", &a, &b, t0()).is_none());
    }

    #[test]
    fn events_are_tagged_by_type() {
        let ev = Event::FastStarted {
            session_id: "s1".into(),
            goal: Goal::Minutes(960),
            at: t0(),
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"], "FastStarted");
        assert_eq!(json["goal"]["minutes"], 960);
    }
}
