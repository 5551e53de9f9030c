//! Live progress loop.
//!
//! Each tick samples the clock once and re-reads the watched fast, so a
//! `stop` or `delete` from another process ends the watch.

use std::io::Write;
use std::time::Duration;

use chrono::Utc;
use fasttrack_core::{Config, Database, Event, FastingSession, FastingSnapshot, Goal, Progress};

use super::print_json;

pub fn run(until_goal: bool, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = Database::open()?;
    let Some(session) = db.active_session()? else {
        if json {
            print_json(&Event::StateSnapshot(FastingSnapshot::idle(Utc::now())))?;
        } else {
            println!("Not fasting");
        }
        return Ok(());
    };
    if until_goal && session.goal == Goal::None {
        return Err("--until-goal needs a fast with a goal (set one with `fasttrack goal`)".into());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .enable_io()
        .build()?;
    runtime.block_on(watch(&db, session, &config, until_goal, json))
}

fn emit(snapshot: FastingSnapshot, config: &Config, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        print_json(&Event::StateSnapshot(snapshot))?;
    } else {
        print!("\r{:<60}", snapshot.summary_opts(config.display.show_seconds));
        std::io::stdout().flush()?;
    }
    Ok(())
}

async fn watch(
    db: &Database,
    session: FastingSession,
    config: &Config,
    until_goal: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut ticker = tokio::time::interval(Duration::from_secs(config.display.refresh_secs));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut previous: Option<Progress> = None;
    tracing::debug!(id = %session.id, refresh_secs = config.display.refresh_secs, "watching fast");

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut ctrl_c => {
                if !json {
                    println!();
                }
                return Ok(());
            }
        }

        let now = Utc::now();
        let Some(current) = db.get(&session.id)? else {
            tracing::debug!(id = %session.id, "watched fast was deleted");
            emit(FastingSnapshot::idle(now), config, json)?;
            if !json {
                println!();
            }
            return Ok(());
        };

        let progress = current.progress_at(now);
        emit(FastingSnapshot::capture(&current, now), config, json)?;
        if !current.is_active() {
            tracing::debug!(id = %current.id, "watched fast was stopped");
            if !json {
                println!();
            }
            return Ok(());
        }

        if until_goal && current.goal == Goal::None {
            if !json {
                println!();
            }
            return Err("goal was cleared while watching with --until-goal".into());
        }

        // A fast that is already past its goal when the watch starts counts as reached.
        let baseline = previous.unwrap_or(Progress {
            goal_met: false,
            ..progress
        });
        if let Some(event) = Event::goal_crossing(&current.id, &baseline, &progress, now) {
            if json {
                print_json(&event)?;
            } else {
                println!("\nGoal reached!");
            }
            if until_goal {
                return Ok(());
            }
        }
        previous = Some(progress);
    }
}
