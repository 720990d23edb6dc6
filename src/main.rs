use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::fs;
use std::path::PathBuf;
use tabled::{Table, Tabled};

use readyrs::api::{
    Engine, SessionScoreRequest, SuggestionRequest, WorkoutCandidatesRequest,
};
use readyrs::config::EngineConfig;
use readyrs::logging::{init_logging, LogConfig, LogLevel};
use readyrs::models::WearableRecovery;

/// readyrs - Readiness & Training Recommendation Engine
///
/// Pure compute over JSON fixtures: daily suggestions from check-ins and
/// wearable data, check-in auto-fill, wearable workout matching, and
/// post-session performance scoring.
#[derive(Parser)]
#[command(name = "readyrs")]
#[command(version = "0.1.0")]
#[command(about = "Readiness & Training Recommendation Engine", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print the raw JSON payload instead of formatted output
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate today's suggestion from a request file
    Suggest {
        /// Suggestion request JSON (check-in, wearable, history, event)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Compute check-in auto-fill values from a wearable snapshot
    Autofill {
        /// Wearable recovery snapshot JSON
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Match a logged session against wearable workout candidates
    Match {
        /// Workout candidates request JSON (session timing + workouts)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Score a logged session across the six pillars
    Score {
        /// Session score request JSON (session, readiness, history)
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[derive(Tabled)]
struct PillarDisplayRow {
    #[tabled(rename = "Pillar")]
    pillar: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Max")]
    max: String,
    #[tabled(rename = "%")]
    pct: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LogLevel::Warn,
        1 => LogLevel::Info,
        2 => LogLevel::Debug,
        _ => LogLevel::Trace,
    };
    init_logging(&LogConfig {
        level,
        ..LogConfig::default()
    })?;

    let config = match &cli.config {
        Some(path) => EngineConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => EngineConfig::load_or_default(),
    };
    let engine = Engine::new(config);

    match cli.command {
        Commands::Suggest { file } => {
            let request: SuggestionRequest = read_json(&file)?;
            let response = engine.today_suggestion(&request)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&response)?);
                return Ok(());
            }

            println!("{}", format!("{}", response.label).green().bold());
            println!("{}", response.suggestion);
            if let Some(readiness) = &response.readiness {
                println!(
                    "  Readiness: {} ({}/20)",
                    readiness.band, readiness.composite_score
                );
            }
            if !response.triggered_rules.is_empty() {
                println!();
                for rule in &response.triggered_rules {
                    println!(
                        "  {} {}",
                        format!("[{}]", rule.name).cyan(),
                        rule.recommendation
                    );
                    println!("      {}", rule.explanation.dimmed());
                }
            }
        }

        Commands::Autofill { file } => {
            let snapshot: Option<WearableRecovery> = read_json(&file)?;
            let response = engine.auto_fill(snapshot.as_ref());

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&response)?);
                return Ok(());
            }

            match &response.auto_fill {
                Some(fill) => {
                    println!("{}", "Auto-fill available".green().bold());
                    println!("  Sleep: {}/5  Energy: {}/5", fill.sleep, fill.energy);
                    if let Some(recovery) = fill.whoop_recovery_score {
                        println!("  Recovery: {}%", recovery);
                    }
                }
                None => println!("{}", "No wearable data for that date".yellow()),
            }
        }

        Commands::Match { file } => {
            let request: WorkoutCandidatesRequest = read_json(&file)?;
            let response = engine.workout_candidates(&request)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&response)?);
                return Ok(());
            }

            use readyrs::api::MatchStatus;
            match response.status {
                MatchStatus::InsufficientData => {
                    println!("{}", "No session start time; cannot match".yellow())
                }
                MatchStatus::NoMatch => {
                    println!("{}", "No overlapping wearable workout".yellow())
                }
                MatchStatus::AutoAccepted => {
                    let workout = &response.workouts[0];
                    println!("{}", "Auto-accepted match".green().bold());
                    println!("  Workout {} ({}% overlap)", workout.id, workout.overlap_pct);
                }
                MatchStatus::NeedsDisambiguation => {
                    println!(
                        "{}",
                        format!("{} candidates need review", response.workouts.len())
                            .cyan()
                            .bold()
                    );
                    for workout in &response.workouts {
                        println!("  {} ({}% overlap)", workout.id, workout.overlap_pct);
                    }
                }
            }
        }

        Commands::Score { file } => {
            let request: SessionScoreRequest = read_json(&file)?;
            let response = engine.session_score(&request)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&response)?);
                return Ok(());
            }

            println!(
                "{}",
                format!("{} {} ({})", response.score, response.label, response.rubric)
                    .green()
                    .bold()
            );
            if response.data_completeness < rust_decimal::Decimal::ONE {
                println!(
                    "  {}",
                    format!("Data completeness: {}", response.data_completeness).yellow()
                );
            }

            let rows: Vec<PillarDisplayRow> = response
                .pillars
                .iter()
                .map(|(name, row)| PillarDisplayRow {
                    pillar: name.clone(),
                    score: row.score.to_string(),
                    max: row.max.to_string(),
                    pct: row.pct.to_string(),
                })
                .collect();
            println!("{}", Table::new(rows));
        }
    }

    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON from {}", path.display()))
}
