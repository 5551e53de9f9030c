use chrono::Utc;
use fasttrack_core::storage::Database;

use super::{format_secs, print_json};

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let stats = db.stats(Utc::now())?;

    if json {
        return print_json(&stats);
    }

    println!("Fasts:          {} ({} completed)", stats.total_fasts, stats.completed_fasts);
    println!("Goals met:      {} of {}", stats.goals_met, stats.fasts_with_goal);
    println!("Longest:        {}", format_secs(stats.longest_secs));
    println!("Average:        {}", format_secs(stats.average_secs));
    println!("Total:          {}", format_secs(stats.total_secs));
    println!("Current streak: {}", stats.current_streak);
    println!("Best streak:    {}", stats.best_streak);
    if let Some(snapshot) = &stats.in_progress {
        println!("Now:            {}", snapshot.summary());
    }
    Ok(())
}
