//! # fasttrack Core Library
//!
//! Core logic for the fasttrack fasting tracker. The CLI is a thin surface
//! over this crate; anything else that renders a fast (widgets, watch faces,
//! voice replies) is expected to consume the same [`FastingSnapshot`].
//!
//! ## Architecture
//!
//! - **Progress model**: a pure function of start, optional end, optional
//!   goal and a caller-sampled `now`. No ambient clock is read inside it.
//! - **Session**: the Active -> Completed lifecycle of one fast
//! - **Storage**: SQLite session store (one active fast at a time) and
//!   TOML-based configuration
//!
//! ## Key Components
//!
//! - [`Progress`]: elapsed time, goal-met, remaining time, progress ratio
//! - [`FastingSession`]: one fasting attempt
//! - [`FastingSnapshot`]: serializable read projection at one instant
//! - [`Database`]: session persistence and statistics
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod progress;
pub mod session;
pub mod snapshot;
pub mod storage;

pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use progress::{Goal, HoursMinutes, Progress};
pub use session::{FastingSession, SessionState};
pub use snapshot::{FastingSnapshot, SnapshotState};
pub use storage::{Config, Database, Stats};
