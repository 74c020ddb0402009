//! url_sentry library: layered phishing risk assessment for URLs.
//!
//! A scan fans out to independent signal collectors (structural URL
//! analysis, redirect chains, page content, TLS posture, domain
//! reputation, WHOIS age, IP risk), merges whatever answered into one
//! weighted score and verdict, classifies the result, and persists an
//! append-only incident record that human feedback can later correct.
//!
//! # Example
//!
//! ```no_run
//! use url_sentry::{build_context, comprehensive_scan, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let ctx = build_context(config).await?;
//! let outcome = comprehensive_scan("https://example.com", &ctx).await?;
//! println!(
//!     "{}: {} (score {})",
//!     outcome.features.full_url,
//!     outcome.assessment.verdict,
//!     outcome.assessment.overall_score
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your
//! application or call from within an async context.

#![warn(missing_docs)]

pub mod aggregate;
pub mod classify;
pub mod collectors;
pub mod config;
pub mod error_handling;
pub mod features;
pub mod incident;
pub mod initialization;
pub mod pipeline;
pub mod service;
pub mod signal;
pub mod storage;
mod utils;

// Re-export public API
pub use aggregate::{RiskAssessment, Verdict};
pub use classify::Category;
pub use config::{Config, LogFormat, LogLevel};
pub use error_handling::{ScanError, ScanStats};
pub use incident::IncidentReport;
pub use pipeline::{comprehensive_scan, ScanContext, ScanOutcome};
pub use service::SecurityScanData;
pub use signal::{SignalResult, SignalSource};
pub use storage::{run_migrations, FeedbackStats, Judgment};

use std::sync::Arc;

use anyhow::Context as _;

/// Builds a ready-to-scan context from a configuration: HTTP clients,
/// DNS resolver, database pool (with migrations applied), and stats.
///
/// The learning sink starts disconnected; callers that want the
/// best-effort event stream can set `learning_sink` on the returned
/// context.
pub async fn build_context(config: Config) -> anyhow::Result<ScanContext> {
    let client = initialization::init_client(&config).context("Failed to initialize HTTP client")?;
    let redirect_client = initialization::init_redirect_client(&config)
        .context("Failed to initialize redirect client")?;
    let resolver = initialization::init_resolver();

    let pool = storage::init_db_pool_with_path(&config.db_path)
        .await
        .context("Failed to initialize database pool")?;
    storage::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    Ok(ScanContext {
        client,
        redirect_client,
        resolver,
        pool,
        config: Arc::new(config),
        stats: Arc::new(ScanStats::new()),
        learning_sink: None,
    })
}
