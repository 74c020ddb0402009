//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `url_sentry` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use url_sentry::initialization::{init_crypto_provider, init_logger_with};
use url_sentry::service;
use url_sentry::{build_context, Config, Judgment, LogFormat, LogLevel};

/// Layered phishing risk assessment for URLs.
#[derive(Debug, Parser)]
#[command(name = "url_sentry", version, about)]
struct Cli {
    /// URLs to scan
    urls: Vec<String>,

    /// Check an email address against the configured breach database
    #[arg(long)]
    email: Option<String>,

    /// Record feedback for an incident id (requires --judgment)
    #[arg(long, requires = "judgment")]
    feedback: Option<String>,

    /// Judgment for --feedback: correct, false_positive, false_negative
    #[arg(long)]
    judgment: Option<String>,

    /// List the most recent incidents
    #[arg(long, value_name = "N")]
    recent: Option<u32>,

    /// Print rolling feedback statistics
    #[arg(long)]
    stats: bool,

    /// Database path (SQLite file)
    #[arg(long, default_value = "./url_sentry.db")]
    db: PathBuf,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value = "plain")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env (provider endpoints, API keys).
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    init_logger_with(cli.log_level.clone().into(), cli.log_format.clone())
        .context("Failed to initialize logger")?;
    init_crypto_provider();

    let config = Config {
        db_path: cli.db.clone(),
        log_level: cli.log_level.clone(),
        log_format: cli.log_format.clone(),
        ..Default::default()
    }
    .apply_env_overrides();

    let ctx = build_context(config).await?;

    if let Some(email) = &cli.email {
        match service::breach_check(&ctx, email).await {
            Ok(result) => println!("{}", serde_json::to_string_pretty(&result)?),
            Err(e) => {
                eprintln!("url_sentry error: {e:#}");
                process::exit(2);
            }
        }
    }

    if let (Some(incident_id), Some(judgment)) = (&cli.feedback, &cli.judgment) {
        let judgment: Judgment = judgment.parse().map_err(|_| {
            anyhow::anyhow!("invalid judgment '{judgment}' (expected correct, false_positive, false_negative)")
        })?;
        match service::submit_feedback(&ctx, incident_id, judgment).await {
            Ok(record) => println!("Feedback recorded for {}", record.incident_id),
            Err(e) => {
                eprintln!("url_sentry error: {e:#}");
                process::exit(2);
            }
        }
    }

    if let Some(limit) = cli.recent {
        for incident in service::recent_incidents(&ctx, limit).await? {
            println!(
                "{}  {}  {:>3}  {}  {}",
                incident.id,
                incident.timestamp.format("%Y-%m-%d %H:%M:%S"),
                incident.risk_assessment.overall_score,
                incident.risk_assessment.verdict,
                incident.url
            );
        }
    }

    if cli.stats {
        let stats = service::feedback_stats(&ctx).await?;
        match stats.accuracy {
            Some(accuracy) => println!(
                "Feedback: {} total ({} correct, {} false positives, {} false negatives), accuracy {:.1}%",
                stats.total,
                stats.correct,
                stats.false_positive,
                stats.false_negative,
                accuracy * 100.0
            ),
            None => println!("Feedback: no data"),
        }
    }

    let mut failures = 0usize;
    for url in &cli.urls {
        match service::security_scan(&ctx, url).await {
            Ok(data) => {
                println!(
                    "{}  score {:>3}  {}  ({} red flag{})",
                    data.url,
                    data.risk_score.overall_score,
                    data.risk_score.verdict,
                    data.risk_score.red_flags.len(),
                    if data.risk_score.red_flags.len() == 1 { "" } else { "s" }
                );
                for flag in &data.risk_score.red_flags {
                    println!("    - {flag}");
                }
                println!("    incident: {}", data.incident_id);
            }
            Err(e) => {
                failures += 1;
                eprintln!("Failed to scan {url}: {e:#}");
            }
        }
    }

    ctx.stats.log_summary();

    if failures > 0 {
        process::exit(1);
    }
    Ok(())
}
