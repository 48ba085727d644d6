use chrono::Utc;
use clap::{Parser, Subcommand};
use fluidez_core::engines::difficulty::parse_answer;
use fluidez_core::export::json::{export_snapshot_to_path, import_snapshot};
use fluidez_core::*;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "fluidez", about = "Review scheduling, streaks and difficulty for Fluidez", version)]
struct Cli {
    /// SQLite file holding the personalization state
    #[arg(long, global = true, env = "FLUIDEZ_DB", default_value = "fluidez.sqlite3")]
    db: PathBuf,

    /// Use the stored simulated date instead of the system clock
    #[arg(long, global = true)]
    simulate: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log filter, e.g. "debug" or "fluidez_core=trace"
    #[arg(long, global = true, env = "RUST_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Grade a vocabulary item (0 = blackout, 5 = perfect)
    Review { item: String, quality: u8 },

    /// List which of the given items are due now
    Due { items: Vec<String> },

    /// Review totals
    Stats,

    /// Mark today's practice as complete
    Complete,

    /// Show the streak summary
    Streak,

    /// Record a quiz answer (true/false)
    Answer { correct: String },

    /// Show the current difficulty level
    Difficulty,

    /// Move the simulated date forward one day
    AdvanceDay,

    /// Write all state to a JSON file
    Export { path: PathBuf },

    /// Replace all state from a JSON file
    Import { path: PathBuf },
}

fn emit<T: Serialize>(json: bool, value: &T, plain: impl FnOnce(&T) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", plain(value));
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let mut store = SqliteStore::open(&cli.db)?;

    if let Command::AdvanceDay = cli.command {
        let date = store.advance_day(Utc::now())?;
        info!(%date, "simulated date advanced");
        return emit(cli.json, &date, |d| format!("Simulated date: {}", d.format("%Y-%m-%d")));
    }

    let now = if cli.simulate {
        store.start_simulation(Utc::now())?
    } else {
        Utc::now()
    };
    let clock = FixedClock::new(now);
    let mut engine = Personalization::new(store, &clock, EngineConfig::from_env())?;

    match cli.command {
        Command::Review { item, quality } => {
            let reviewed = engine.submit_review_result(&item, quality)?;
            emit(cli.json, &reviewed, |r| {
                format!(
                    "{}: next review in {} day(s), ease {:.2}, {} repetition(s)",
                    r.id, r.interval, r.ease_factor, r.repetitions
                )
            })
        }
        Command::Due { items } => {
            let due = engine.query_due_reviews(&items);
            emit(cli.json, &due, |due| {
                if due.is_empty() {
                    return "Nothing due.".to_string();
                }
                due.iter()
                    .map(|d| match (d.is_new, d.overdue_days) {
                        (true, _) => format!("{} (new)", d.item.id),
                        (false, 0) => d.item.id.clone(),
                        (false, days) => format!("{} ({days} day(s) overdue)", d.item.id),
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        Command::Stats => {
            let stats = engine.query_review_stats();
            emit(cli.json, &stats, |s| {
                format!("{} items, {} due, {} mastered", s.total, s.due, s.mastered)
            })
        }
        Command::Complete => {
            let outcome = engine.submit_practice_completion()?;
            let message = encouragement::pick(&outcome, &mut rand::thread_rng());
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "outcome": outcome,
                        "message": message,
                    }))?
                );
                return Ok(());
            }
            println!(
                "{message}\nStreak: {} day(s) ({:?})",
                outcome.state.current_streak, outcome.status
            );
            Ok(())
        }
        Command::Streak => {
            let summary = engine.query_streak();
            emit(cli.json, &summary, |s| {
                let next = s
                    .next_milestone
                    .as_ref()
                    .map(|m| format!("{} {} in {} day(s)", m.badge, m.name, m.days - s.current_streak))
                    .unwrap_or_else(|| "all milestones reached".to_string());
                format!(
                    "Current {} | longest {} | total {} | freezes {} | this month {}/{} | next: {}",
                    s.current_streak,
                    s.longest_streak,
                    s.total_days,
                    s.freezes_available,
                    s.practice_days_this_month,
                    s.monthly_goal,
                    next
                )
            })
        }
        Command::Answer { correct } => {
            let outcome = engine.submit_quiz_answer(parse_answer(&correct)?)?;
            emit(cli.json, &outcome, |o| {
                format!(
                    "Success rate {:.0}%, difficulty {}",
                    o.success_rate * 100.0,
                    o.difficulty_level
                )
            })
        }
        Command::Difficulty => {
            let level = engine.query_difficulty();
            emit(cli.json, &level, |l| format!("Difficulty level {l}"))
        }
        Command::Export { path } => {
            export_snapshot_to_path(&engine.export_snapshot(), &path)?;
            println!("State exported to '{}'", path.display());
            Ok(())
        }
        Command::Import { path } => {
            engine.restore_snapshot(import_snapshot(&path)?)?;
            println!("State imported from '{}'", path.display());
            Ok(())
        }
        Command::AdvanceDay => Ok(()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _log_guard = logging::init_tracing(&cli.log_level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "command failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
