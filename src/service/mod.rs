//! Typed operations matching the external endpoint contracts.
//!
//! The HTTP layer that fronts this crate is transport plumbing; each of
//! its routes maps 1:1 onto a function here. Input validation happens at
//! this boundary, so a collector never sees a URL or email that failed
//! to parse.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::aggregate::{simple_verdict, RiskAssessment, Verdict};
use crate::classify::{classify, Category};
use crate::collectors::breach::BreachHistory;
use crate::collectors::ip_risk::IpRiskProfile;
use crate::collectors::page::PageInspection;
use crate::collectors::redirects::RedirectAnalysis;
use crate::collectors::reputation::ReputationSummary;
use crate::collectors::tls::TlsAudit;
use crate::collectors::whois::WhoisAge;
use crate::collectors::{ip_risk, page, redirects, reputation, tls, whois};
use crate::error_handling::ScanError;
use crate::features::{extract, structural_flags, UrlFeatures};
use crate::incident::IncidentReport;
use crate::pipeline::{breach_scan, comprehensive_scan, ScanContext, ScanOutcome};
use crate::signal::SignalResult;
use crate::storage::{
    feedback_stats as stored_feedback_stats, get_incident, record_feedback as store_feedback,
    recent_incidents as stored_recent_incidents, FeedbackRecord, FeedbackStats, Judgment,
};

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static regex"));

/// Validates an email address for the breach endpoints.
pub fn validate_email(raw: &str) -> Result<String, ScanError> {
    let trimmed = raw.trim();
    if EMAIL_REGEX.is_match(trimmed) {
        Ok(trimmed.to_ascii_lowercase())
    } else {
        Err(ScanError::InvalidEmail(raw.to_string()))
    }
}

/// Structural-only risk score: the URL-only scoring path with its own
/// banding policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlRiskScore {
    /// Normalized URL that was scored.
    pub url: String,
    /// Matched structural red flags, detection order.
    pub red_flags: Vec<String>,
    /// Step-function score for the flag count.
    pub score: u8,
    /// Verdict under the URL-only policy.
    pub verdict: Verdict,
}

/// Category and policy outcome for a URL, from structural signals alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDecision {
    /// Normalized URL that was classified.
    pub url: String,
    /// Assigned category.
    pub category: Category,
    /// Policy-compliance outcome.
    pub policy_compliant: bool,
}

/// Response payload of a comprehensive scan, shaped for the external
/// contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityScanData {
    /// Scanned (normalized) URL.
    pub url: String,
    /// Score, verdict, and per-source breakdown.
    pub risk_score: RiskScorePayload,
    /// Collector payloads that answered.
    pub details: SecurityScanDetails,
    /// Scan completion time, UTC.
    pub timestamp: DateTime<Utc>,
    /// Id of the persisted incident for feedback linking.
    pub incident_id: String,
}

/// Score portion of `SecurityScanData`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskScorePayload {
    /// Combined 0-100 score.
    pub overall_score: u8,
    /// Verdict band.
    pub verdict: Verdict,
    /// Per-source breakdown from the assessment.
    pub breakdown: std::collections::BTreeMap<String, crate::aggregate::BreakdownEntry>,
    /// Deduplicated red flags.
    pub red_flags: Vec<String>,
}

/// Detail portion of `SecurityScanData`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityScanDetails {
    /// Reputation summary, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reputation: Option<ReputationSummary>,
    /// WHOIS findings, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whois_data: Option<WhoisAge>,
    /// TLS audit, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_audit: Option<TlsAudit>,
}

// Layer A: structural and content collectors.

/// `POST /security/analyze-redirects`
pub async fn analyze_redirects(
    ctx: &ScanContext,
    url: &str,
) -> Result<SignalResult<RedirectAnalysis>, ScanError> {
    let features = extract(url)?;
    Ok(redirects::analyze_redirects(ctx, &features).await)
}

/// `POST /security/scan-page-content`
pub async fn scan_page_content(
    ctx: &ScanContext,
    url: &str,
) -> Result<SignalResult<PageInspection>, ScanError> {
    let features = extract(url)?;
    Ok(page::inspect_page(ctx, &features).await)
}

/// `POST /security/inspect-forms`
///
/// Same fetch as the content scan; the form findings are the part the
/// caller cares about.
pub async fn inspect_forms(
    ctx: &ScanContext,
    url: &str,
) -> Result<SignalResult<PageInspection>, ScanError> {
    scan_page_content(ctx, url).await
}

/// `POST /security/audit-tls`
pub async fn audit_tls(
    ctx: &ScanContext,
    url: &str,
) -> Result<SignalResult<TlsAudit>, ScanError> {
    let features = extract(url)?;
    Ok(tls::audit_tls(ctx, &features).await)
}

// Layer B: threat-intelligence collectors.

/// `POST /security/lookup-reputation`
pub async fn lookup_reputation(
    ctx: &ScanContext,
    url: &str,
) -> Result<SignalResult<ReputationSummary>, ScanError> {
    let features = extract(url)?;
    Ok(reputation::lookup_reputation(ctx, &features).await)
}

/// `POST /security/check-whois`
pub async fn check_whois(
    ctx: &ScanContext,
    url: &str,
) -> Result<SignalResult<WhoisAge>, ScanError> {
    let features = extract(url)?;
    Ok(whois::check_whois(ctx, &features).await)
}

/// `POST /security/ip-risk-profile`
pub async fn ip_risk_profile(
    ctx: &ScanContext,
    url: &str,
) -> Result<SignalResult<IpRiskProfile>, ScanError> {
    let features = extract(url)?;
    Ok(ip_risk::profile_ip_risk(ctx, &features).await)
}

/// `POST /security/breach-check`
pub async fn breach_check(
    ctx: &ScanContext,
    email: &str,
) -> Result<SignalResult<BreachHistory>, ScanError> {
    let email = validate_email(email)?;
    Ok(breach_scan(&email, ctx).await)
}

// Layer C: classification and the URL-only scoring path.

/// `POST /security/calculate-risk-score`
///
/// Structural signals only, no network; banded by the URL-only policy.
pub fn calculate_risk_score(url: &str) -> Result<UrlRiskScore, ScanError> {
    let features = extract(url)?;
    let red_flags = structural_flags(&features);
    Ok(UrlRiskScore {
        url: features.full_url,
        score: crate::aggregate::structural_sub_score(red_flags.len()),
        verdict: simple_verdict(red_flags.len()),
        red_flags,
    })
}

/// `POST /security/classify-category`
pub fn classify_category(url: &str) -> Result<CategoryDecision, ScanError> {
    let features = extract(url)?;
    let assessment = structural_assessment(&features);
    let (category, policy_compliant) = classify(&features, &assessment);
    Ok(CategoryDecision {
        url: features.full_url,
        category,
        policy_compliant,
    })
}

/// `POST /security/check-policy`
pub fn check_policy(url: &str) -> Result<bool, ScanError> {
    classify_category(url).map(|decision| decision.policy_compliant)
}

fn structural_assessment(features: &UrlFeatures) -> RiskAssessment {
    let flags = structural_flags(features);
    crate::aggregate::aggregate(&[crate::aggregate::Contribution::scored(
        crate::signal::SignalSource::Structural,
        crate::aggregate::structural_sub_score(flags.len()),
        flags,
    )])
}

// Layer D: incidents and feedback.

/// `POST /security/comprehensive-scan`
pub async fn security_scan(ctx: &ScanContext, url: &str) -> Result<SecurityScanData, ScanError> {
    let outcome = comprehensive_scan(url, ctx).await?;
    Ok(into_scan_data(outcome))
}

/// `POST /security/generate-incident-report`
///
/// Runs the full pipeline and returns the persisted incident.
pub async fn generate_incident_report(
    ctx: &ScanContext,
    url: &str,
) -> Result<IncidentReport, ScanError> {
    let outcome = comprehensive_scan(url, ctx).await?;
    Ok(outcome.incident)
}

/// `POST /security/submit-feedback`
pub async fn submit_feedback(
    ctx: &ScanContext,
    incident_id: &str,
    judgment: Judgment,
) -> Result<FeedbackRecord, ScanError> {
    store_feedback(&ctx.pool, incident_id, judgment).await
}

/// `GET /security/feedback-stats`
pub async fn feedback_stats(ctx: &ScanContext) -> Result<FeedbackStats, ScanError> {
    stored_feedback_stats(&ctx.pool).await
}

/// `GET /security/recent-incidents`
pub async fn recent_incidents(
    ctx: &ScanContext,
    limit: u32,
) -> Result<Vec<IncidentReport>, ScanError> {
    stored_recent_incidents(&ctx.pool, limit).await
}

/// Looks up one incident by id.
pub async fn incident_by_id(
    ctx: &ScanContext,
    id: &str,
) -> Result<Option<IncidentReport>, ScanError> {
    get_incident(&ctx.pool, id).await
}

fn into_scan_data(outcome: ScanOutcome) -> SecurityScanData {
    let ScanOutcome {
        features,
        assessment,
        incident,
        details,
        ..
    } = outcome;
    SecurityScanData {
        url: features.full_url,
        risk_score: RiskScorePayload {
            overall_score: assessment.overall_score,
            verdict: assessment.verdict,
            breakdown: assessment.breakdown,
            red_flags: assessment.red_flags,
        },
        details: SecurityScanDetails {
            reputation: details.reputation,
            whois_data: details.whois_data,
            tls_audit: details.tls_audit,
        },
        timestamp: incident.timestamp,
        incident_id: incident.id.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email_accepts_plausible_addresses() {
        assert_eq!(
            validate_email("User@Example.COM").unwrap(),
            "user@example.com"
        );
        assert!(validate_email("a.b+tag@sub.example.org").is_ok());
    }

    #[test]
    fn test_validate_email_rejects_garbage() {
        assert!(matches!(
            validate_email("not-an-email"),
            Err(ScanError::InvalidEmail(_))
        ));
        assert!(matches!(
            validate_email("a@b"),
            Err(ScanError::InvalidEmail(_))
        ));
        assert!(matches!(
            validate_email("two@@example.com"),
            Err(ScanError::InvalidEmail(_))
        ));
        assert!(matches!(
            validate_email(""),
            Err(ScanError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_calculate_risk_score_clean_url() {
        let score = calculate_risk_score("https://example.com").unwrap();
        assert_eq!(score.score, 0);
        assert_eq!(score.verdict, Verdict::NoStrongSignals);
        assert!(score.red_flags.is_empty());
    }

    #[test]
    fn test_calculate_risk_score_phishy_url() {
        let score = calculate_risk_score("http://192.168.1.1@paypal-login.tk/verify").unwrap();
        assert!(score.red_flags.len() >= 3);
        assert_eq!(score.score, 90);
        assert_eq!(score.verdict, Verdict::LikelyPhishing);
    }

    #[test]
    fn test_single_flag_is_suspicious_on_simple_path() {
        // One structural flag (the suspicious TLD) under the URL-only
        // policy bands as suspicious, not likely_phishing.
        let score = calculate_risk_score("https://example.tk").unwrap();
        assert_eq!(score.red_flags.len(), 1);
        assert_eq!(score.verdict, Verdict::Suspicious);
    }

    #[test]
    fn test_classify_category_clean_url() {
        let decision = classify_category("https://example.com").unwrap();
        assert_eq!(decision.category, Category::Benign);
        assert!(decision.policy_compliant);
        assert!(check_policy("https://example.com").unwrap());
    }

    #[test]
    fn test_classify_category_rejects_invalid_url() {
        assert!(matches!(
            classify_category("///"),
            Err(ScanError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_security_scan_data_serializes_camel_case() {
        let data = SecurityScanData {
            url: "https://example.com".to_string(),
            risk_score: RiskScorePayload {
                overall_score: 10,
                verdict: Verdict::NoStrongSignals,
                breakdown: Default::default(),
                red_flags: Vec::new(),
            },
            details: SecurityScanDetails::default(),
            timestamp: Utc::now(),
            incident_id: "inc_1".to_string(),
        };
        let json = serde_json::to_value(&data).unwrap();
        assert!(json.get("riskScore").is_some());
        assert_eq!(json["riskScore"]["overallScore"], 10);
        assert_eq!(json["riskScore"]["verdict"], "no_strong_signals");
        assert!(json.get("incidentId").is_some());
    }
}
