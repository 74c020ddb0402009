//! The scan pipeline.
//!
//! One scan request fans out to every applicable collector concurrently,
//! each wrapped in its own settle budget; aggregation is the single join
//! point and starts only after every collector has settled. Dropping the
//! returned future cancels all in-flight collector calls.

use std::sync::Arc;

use chrono::Utc;
use hickory_resolver::TokioAsyncResolver;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tokio::sync::mpsc;

use crate::aggregate::{
    aggregate, structural_sub_score, Contribution, RiskAssessment,
};
use crate::classify::{classify, Category};
use crate::collectors::breach::BreachHistory;
use crate::collectors::ip_risk::IpRiskProfile;
use crate::collectors::page::PageInspection;
use crate::collectors::redirects::RedirectAnalysis;
use crate::collectors::reputation::ReputationSummary;
use crate::collectors::tls::TlsAudit;
use crate::collectors::whois::WhoisAge;
use crate::collectors::{breach, ip_risk, page, redirects, reputation, tls, whois};
use crate::config::Config;
use crate::error_handling::{ScanError, ScanStats};
use crate::features::{extract, structural_flags, UrlFeatures};
use crate::incident::{generate, IncidentReport};
use crate::signal::{SignalResult, SignalSource};
use crate::storage::insert_incident;

/// Best-effort event emitted toward the learning sink after each scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanEvent {
    /// Scanned URL.
    pub url: String,
    /// Final score.
    pub overall_score: u8,
    /// Verdict name.
    pub verdict: String,
    /// Assigned category.
    pub category: Category,
    /// Event time, epoch milliseconds.
    pub timestamp_millis: i64,
}

/// Context containing all shared resources needed for scanning.
///
/// Cheap to clone; everything inside is reference counted. Collectors
/// receive it by reference and hold no state of their own.
#[derive(Clone)]
pub struct ScanContext {
    /// HTTP client with redirects enabled (page and provider fetches).
    pub client: Arc<reqwest::Client>,
    /// HTTP client with redirects disabled (manual chain walking).
    pub redirect_client: Arc<reqwest::Client>,
    /// Shared DNS resolver.
    pub resolver: Arc<TokioAsyncResolver>,
    /// Incident store pool.
    pub pool: Arc<SqlitePool>,
    /// Process-wide configuration.
    pub config: Arc<Config>,
    /// Scan outcome counters.
    pub stats: Arc<ScanStats>,
    /// Optional learning sink. Failure to deliver never affects the
    /// response path.
    pub learning_sink: Option<mpsc::UnboundedSender<ScanEvent>>,
}

/// Collector payloads kept for the scan response (`details` in the
/// external contract).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanDetails {
    /// Redirect chain findings, when that collector answered.
    pub redirects: Option<RedirectAnalysis>,
    /// Page findings, when that collector answered.
    pub page: Option<PageInspection>,
    /// TLS audit, when that collector answered.
    pub tls_audit: Option<TlsAudit>,
    /// Reputation summary, when that collector answered.
    pub reputation: Option<ReputationSummary>,
    /// WHOIS age findings, when that collector answered.
    pub whois_data: Option<WhoisAge>,
    /// IP risk profile, when that collector answered.
    pub ip_risk: Option<IpRiskProfile>,
}

/// Everything produced by one comprehensive scan.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Extracted structural features.
    pub features: UrlFeatures,
    /// The aggregate assessment.
    pub assessment: RiskAssessment,
    /// Assigned category.
    pub category: Category,
    /// Policy-compliance outcome.
    pub policy_compliant: bool,
    /// The persisted incident record.
    pub incident: IncidentReport,
    /// Collector payloads for the response body.
    pub details: ScanDetails,
}

/// Wraps a collector future in its settle budget. A collector that
/// misses its budget becomes `Unavailable`; it never delays the others
/// past the budget and never fails the scan.
async fn settle<T>(
    ctx: &ScanContext,
    source: SignalSource,
    fut: impl std::future::Future<Output = SignalResult<T>>,
) -> SignalResult<T> {
    let budget = std::time::Duration::from_millis(ctx.config.collector_budget_ms);
    let result = match tokio::time::timeout(budget, fut).await {
        Ok(result) => result,
        Err(_) => SignalResult::unavailable(format!(
            "timed out after {}ms",
            ctx.config.collector_budget_ms
        )),
    };
    if let SignalResult::Unavailable { reason } = &result {
        log::warn!("Collector {source} unavailable: {reason}");
        ctx.stats.record_unavailable(source);
    }
    result
}

/// Runs the full pipeline for one URL: extract, fan out, aggregate,
/// classify, persist.
///
/// Extraction failures reject the request; everything downstream
/// degrades gracefully. The returned incident has already been written
/// to the store.
pub async fn comprehensive_scan(raw_url: &str, ctx: &ScanContext) -> Result<ScanOutcome, ScanError> {
    let features = extract(raw_url)?;
    log::info!("Scanning {}", features.full_url);

    // Fan out. Every collector settles (value or budget timeout) before
    // aggregation starts; no partial short-circuiting.
    let (redirects_r, page_r, tls_r, reputation_r, whois_r, ip_risk_r) = tokio::join!(
        settle(ctx, SignalSource::Redirects, redirects::analyze_redirects(ctx, &features)),
        settle(ctx, SignalSource::PageContent, page::inspect_page(ctx, &features)),
        settle(ctx, SignalSource::Tls, tls::audit_tls(ctx, &features)),
        settle(ctx, SignalSource::Reputation, reputation::lookup_reputation(ctx, &features)),
        settle(ctx, SignalSource::Whois, whois::check_whois(ctx, &features)),
        settle(ctx, SignalSource::IpRisk, ip_risk::profile_ip_risk(ctx, &features)),
    );

    let outcome = assemble_outcome(
        ctx,
        features,
        redirects_r,
        page_r,
        tls_r,
        reputation_r,
        whois_r,
        ip_risk_r,
    );

    insert_incident(&ctx.pool, &outcome.incident).await?;
    ctx.stats.record_incident();

    emit_learning_event(ctx, &outcome);

    Ok(outcome)
}

/// Joins the settled collector results into the final outcome. Pure with
/// respect to the network: everything has already settled.
#[allow(clippy::too_many_arguments)]
fn assemble_outcome(
    ctx: &ScanContext,
    features: UrlFeatures,
    redirects_r: SignalResult<RedirectAnalysis>,
    page_r: SignalResult<PageInspection>,
    tls_r: SignalResult<TlsAudit>,
    reputation_r: SignalResult<ReputationSummary>,
    whois_r: SignalResult<WhoisAge>,
    ip_risk_r: SignalResult<IpRiskProfile>,
) -> ScanOutcome {
    let flags = structural_flags(&features);
    let mut contributions = vec![Contribution::scored(
        SignalSource::Structural,
        structural_sub_score(flags.len()),
        flags,
    )];
    let mut answered = vec![SignalSource::Structural];
    let mut details = ScanDetails::default();

    // Contribution order is the collector invocation order; it fixes the
    // red-flag concatenation order.
    push_contribution(
        &mut contributions,
        &mut answered,
        SignalSource::Redirects,
        &redirects_r,
        |value| (value.sub_score(), value.flags.clone()),
    );
    details.redirects = into_value(redirects_r);

    push_contribution(
        &mut contributions,
        &mut answered,
        SignalSource::PageContent,
        &page_r,
        |value| (value.sub_score(), value.flags.clone()),
    );
    details.page = into_value(page_r);

    push_contribution(
        &mut contributions,
        &mut answered,
        SignalSource::Tls,
        &tls_r,
        |value| (value.sub_score(), value.flags.clone()),
    );
    details.tls_audit = into_value(tls_r);

    push_contribution(
        &mut contributions,
        &mut answered,
        SignalSource::Reputation,
        &reputation_r,
        |value| (value.sub_score(), value.flags.clone()),
    );
    details.reputation = into_value(reputation_r);

    let young_days = ctx.config.young_domain_threshold_days;
    push_contribution(
        &mut contributions,
        &mut answered,
        SignalSource::Whois,
        &whois_r,
        |value| (value.sub_score(young_days), value.flags.clone()),
    );
    details.whois_data = into_value(whois_r);

    push_contribution(
        &mut contributions,
        &mut answered,
        SignalSource::IpRisk,
        &ip_risk_r,
        |value| (value.sub_score(), value.flags.clone()),
    );
    details.ip_risk = into_value(ip_risk_r);

    let assessment = aggregate(&contributions);
    let (category, policy_compliant) = classify(&features, &assessment);
    let degraded = answered.len() < contributions.len();
    ctx.stats.record_scan(degraded);

    let incident = generate(&features.full_url, assessment.clone(), category, &answered);

    ScanOutcome {
        features,
        assessment,
        category,
        policy_compliant,
        incident,
        details,
    }
}

fn push_contribution<T>(
    contributions: &mut Vec<Contribution>,
    answered: &mut Vec<SignalSource>,
    source: SignalSource,
    result: &SignalResult<T>,
    score: impl FnOnce(&T) -> (u8, Vec<String>),
) {
    match result {
        SignalResult::Available { value, .. } => {
            let (sub_score, flags) = score(value);
            contributions.push(Contribution::scored(source, sub_score, flags));
            answered.push(source);
        }
        SignalResult::Unavailable { reason } => {
            contributions.push(Contribution::missing(source, reason.clone()));
        }
    }
}

fn into_value<T>(result: SignalResult<T>) -> Option<T> {
    match result {
        SignalResult::Available { value, .. } => Some(value),
        SignalResult::Unavailable { .. } => None,
    }
}

/// Hands the scan outcome to the learning sink, best effort. A closed or
/// missing sink is never an error on the response path.
fn emit_learning_event(ctx: &ScanContext, outcome: &ScanOutcome) {
    let Some(sink) = &ctx.learning_sink else {
        return;
    };
    let event = ScanEvent {
        url: outcome.features.full_url.clone(),
        overall_score: outcome.assessment.overall_score,
        verdict: outcome.assessment.verdict.as_str().to_string(),
        category: outcome.category,
        timestamp_millis: Utc::now().timestamp_millis(),
    };
    if let Err(e) = sink.send(event) {
        log::debug!("Learning sink unavailable, dropping event: {e}");
    }
}

/// Runs only the breach collector for an email address, under the same
/// settle budget as the URL collectors.
pub async fn breach_scan(email: &str, ctx: &ScanContext) -> SignalResult<BreachHistory> {
    settle(ctx, SignalSource::Breach, breach::check_breaches(ctx, email)).await
}
