//! SQLite-based fasting session storage and statistics.
//!
//! Provides persistent storage for:
//! - The single active fast, if any
//! - Completed fasts (history)
//! - Aggregate statistics derived through the progress model

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, DatabaseError, Result};
use crate::progress::Goal;
use crate::session::FastingSession;
use crate::snapshot::FastingSnapshot;

use super::{data_dir, migrations};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const SELECT_COLUMNS: &str = "SELECT id, start_time, end_time, goal_minutes FROM fasts";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Stats {
    pub total_fasts: u64,
    pub completed_fasts: u64,
    /// Completed fasts that had a goal.
    pub fasts_with_goal: u64,
    pub goals_met: u64,
    pub total_secs: u64,
    pub longest_secs: u64,
    pub average_secs: u64,
    /// Consecutive completed fasts, newest first, that met their goal.
    pub current_streak: u64,
    pub best_streak: u64,
    pub in_progress: Option<FastingSnapshot>,
}

type RawRow = (String, String, Option<String>, Option<i64>);

/// SQLite database for fasting sessions.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/fasttrack.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(data_dir()?.join("fasttrack.db"))
    }

    /// Open (or create) a database file at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        // `watch` reads while other invocations write.
        conn.busy_timeout(BUSY_TIMEOUT)?;
        tracing::debug!(path = %path.display(), "opened session store");
        Self::with_connection(conn)
    }

    /// Open an in-memory database (for tests).
    ///
    /// # Errors
    /// Returns an error if migration fails.
    pub fn open_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Start a new fast.
    ///
    /// # Errors
    /// Returns [`CoreError::ActiveSessionExists`] if a fast is already running.
    pub fn start_fast(&self, start_time: DateTime<Utc>, goal: Goal) -> Result<FastingSession> {
        let tx = self.conn.unchecked_transaction()?;
        if let Some(active) = query_active(&tx)? {
            return Err(CoreError::ActiveSessionExists { id: active.id });
        }

        let session = FastingSession::start(start_time, goal);
        tx.execute(
            "INSERT INTO fasts (id, start_time, end_time, goal_minutes) VALUES (?1, ?2, NULL, ?3)",
            params![
                session.id,
                encode_time(session.start_time),
                session.goal.minutes().map(i64::from),
            ],
        )?;
        tx.commit()?;

        tracing::info!(id = %session.id, goal = %session.goal, "fast started");
        Ok(session)
    }

    /// Stop the active fast at `end_time`.
    ///
    /// # Errors
    /// Returns [`CoreError::NoActiveSession`] if nothing is running, or a
    /// validation error if `end_time` precedes the start.
    pub fn stop_fast(&self, end_time: DateTime<Utc>) -> Result<FastingSession> {
        let tx = self.conn.unchecked_transaction()?;
        let mut session = query_active(&tx)?.ok_or(CoreError::NoActiveSession)?;
        session.stop(end_time)?;
        tx.execute(
            "UPDATE fasts SET end_time = ?1 WHERE id = ?2",
            params![encode_time(end_time), session.id],
        )?;
        tx.commit()?;

        tracing::info!(id = %session.id, "fast stopped");
        Ok(session)
    }

    /// Replace the goal of the active fast. Returns the updated session and the previous goal.
    ///
    /// # Errors
    /// Returns [`CoreError::NoActiveSession`] if nothing is running.
    pub fn set_goal(&self, goal: Goal) -> Result<(FastingSession, Goal)> {
        let tx = self.conn.unchecked_transaction()?;
        let mut session = query_active(&tx)?.ok_or(CoreError::NoActiveSession)?;
        let previous = session.goal;
        session.goal = goal;
        tx.execute(
            "UPDATE fasts SET goal_minutes = ?1 WHERE id = ?2",
            params![goal.minutes().map(i64::from), session.id],
        )?;
        tx.commit()?;

        tracing::debug!(id = %session.id, from = %previous, to = %goal, "goal changed");
        Ok((session, previous))
    }

    /// The fast currently running, if any.
    pub fn active_session(&self) -> Result<Option<FastingSession>> {
        query_active(&self.conn)
    }

    pub fn get(&self, id: &str) -> Result<Option<FastingSession>> {
        let raw = self
            .conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id],
                read_raw,
            )
            .optional()?;
        raw.map(decode_row).transpose()
    }

    /// All fasts, newest start first. `None` means no limit.
    pub fn history(&self, limit: Option<usize>) -> Result<Vec<FastingSession>> {
        let limit = limit.map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX));
        let mut stmt = self.conn.prepare(&format!(
            "{SELECT_COLUMNS} ORDER BY start_time DESC LIMIT ?1"
        ))?;
        let rows = stmt.query_map(params![limit], read_raw)?;

        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(decode_row(row?)?);
        }
        Ok(sessions)
    }

    /// Delete a fast by id.
    ///
    /// # Errors
    /// Returns [`CoreError::SessionNotFound`] if no row matched.
    pub fn delete(&self, id: &str) -> Result<()> {
        let affected = self
            .conn
            .execute("DELETE FROM fasts WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(CoreError::SessionNotFound(id.to_string()));
        }
        tracing::info!(id, "fast deleted");
        Ok(())
    }

    /// Aggregate statistics. `now` is only used for the in-progress snapshot.
    pub fn stats(&self, now: DateTime<Utc>) -> Result<Stats> {
        let sessions = self.history(None)?;
        let mut stats = Stats {
            total_fasts: sessions.len() as u64,
            ..Stats::default()
        };

        let mut streak = 0u64;
        let mut current_open = true;
        // Newest first.
        for session in &sessions {
            if session.is_active() {
                stats.in_progress = Some(FastingSnapshot::capture(session, now));
                continue;
            }

            let progress = session.progress_at(now);
            stats.completed_fasts += 1;
            stats.total_secs += progress.duration_secs;
            stats.longest_secs = stats.longest_secs.max(progress.duration_secs);
            if session.goal.is_set() {
                stats.fasts_with_goal += 1;
            }

            if progress.goal_met {
                stats.goals_met += 1;
                streak += 1;
                if current_open {
                    stats.current_streak = streak;
                }
            } else {
                current_open = false;
                streak = 0;
            }
            stats.best_streak = stats.best_streak.max(streak);
        }

        if stats.completed_fasts > 0 {
            stats.average_secs = stats.total_secs / stats.completed_fasts;
        }
        Ok(stats)
    }
}

fn encode_time(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_time(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            DatabaseError::CorruptRow {
                table: "fasts".into(),
                message: format!("bad timestamp '{raw}': {e}"),
            }
            .into()
        })
}

fn read_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn decode_row((id, start, end, goal): RawRow) -> Result<FastingSession> {
    if matches!(goal, Some(m) if m < 0) {
        tracing::warn!(%id, goal_minutes = ?goal, "negative goal in store, clamping to 0");
    }
    Ok(FastingSession {
        start_time: decode_time(&start)?,
        end_time: end.as_deref().map(decode_time).transpose()?,
        goal: Goal::from_raw(goal),
        id,
    })
}

fn query_active(conn: &Connection) -> Result<Option<FastingSession>> {
    let raw = conn
        .query_row(
            &format!("{SELECT_COLUMNS} WHERE end_time IS NULL LIMIT 1"),
            [],
            read_raw,
        )
        .optional()?;
    raw.map(decode_row).transpose()
}
