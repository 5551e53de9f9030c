use chrono::Utc;
use fasttrack_core::{CoreError, Database, Event, FastingSnapshot, Goal};

use super::{format_secs, print_json};

pub fn list(limit: Option<usize>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let now = Utc::now();
    let db = Database::open()?;
    let sessions = db.history(limit)?;

    if json {
        let snapshots: Vec<FastingSnapshot> = sessions
            .iter()
            .map(|s| FastingSnapshot::capture(s, now))
            .collect();
        return print_json(&snapshots);
    }

    if sessions.is_empty() {
        println!("No fasts recorded");
        return Ok(());
    }

    for session in &sessions {
        let progress = session.progress_at(now);
        let marker = match session.goal {
            Goal::None => "-",
            Goal::Minutes(_) if progress.goal_met => "met",
            Goal::Minutes(_) => "missed",
        };
        let state = if session.is_active() { " (active)" } else { "" };
        println!(
            "{}  {}  {:>9}  goal {:<8} {marker}{state}",
            session.id,
            session.start_time.format("%Y-%m-%d %H:%M"),
            format_secs(progress.duration_secs),
            session.goal.to_string(),
        );
    }
    Ok(())
}

pub fn delete(id: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let resolved = resolve_id(&db, id)?;
    db.delete(&resolved)?;

    if json {
        print_json(&Event::FastDeleted {
            session_id: resolved,
            at: Utc::now(),
        })?;
    } else {
        println!("Deleted {resolved}");
    }
    Ok(())
}

/// Resolve a full id or a unique prefix of one.
fn resolve_id(db: &Database, id: &str) -> Result<String, Box<dyn std::error::Error>> {
    if db.get(id)?.is_some() {
        return Ok(id.to_string());
    }
    let matches: Vec<String> = db
        .history(None)?
        .into_iter()
        .map(|s| s.id)
        .filter(|candidate| !id.is_empty() && candidate.starts_with(id))
        .collect();
    match matches.as_slice() {
        [only] => Ok(only.clone()),
        [] => Err(CoreError::SessionNotFound(id.to_string()).into()),
        _ => Err(format!("ambiguous id prefix '{id}' matches {} fasts", matches.len()).into()),
    }
}
