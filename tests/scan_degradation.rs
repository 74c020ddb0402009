// Integration tests for graceful degradation: a comprehensive scan in an
// environment where no network collector can answer must still settle,
// score from the sources that did answer, persist its incident, and show
// the missing sources in the breakdown.

mod helpers;

use url_sentry::pipeline::comprehensive_scan;
use url_sentry::service;
use url_sentry::storage::get_incident;
use url_sentry::{ScanError, SignalSource, Verdict};

use helpers::{create_test_pool, offline_context};

#[tokio::test]
async fn test_degraded_scan_scores_from_answered_sources() {
    let pool = create_test_pool().await;
    let ctx = offline_context(pool);

    // Structural analysis always answers; the TLS auditor answers
    // immediately for plain-http URLs. Everything network-bound misses
    // its 1ms budget.
    let outcome = comprehensive_scan("http://paypal-login.tk/verify", &ctx)
        .await
        .expect("scan should settle despite degraded collectors");

    // Structural flags alone put this deep into phishing territory.
    assert_eq!(outcome.assessment.verdict, Verdict::LikelyPhishing);
    assert!(outcome.assessment.red_flags.len() >= 3);
    assert!(outcome
        .assessment
        .red_flags
        .iter()
        .any(|f| f.contains("paypal")));

    // Missing sources are present in the breakdown with zero weight.
    let reputation = &outcome.assessment.breakdown["domain_reputation"];
    assert_eq!(reputation.weight, 0);
    assert!(reputation.note.is_some());

    // The structural entry carries its configured weight.
    let structural = &outcome.assessment.breakdown["structural_url_analysis"];
    assert_eq!(structural.weight, 25);
    assert_eq!(structural.sub_score, Some(90));

    // No threat-intelligence source answered, so the incident is not
    // SIEM-ready.
    assert!(!outcome.incident.siem_ready);
}

#[tokio::test]
async fn test_degraded_scan_persists_round_trippable_incident() {
    let pool = create_test_pool().await;
    let ctx = offline_context(pool);

    let outcome = comprehensive_scan("http://paypal-login.tk/verify", &ctx)
        .await
        .expect("scan");

    let loaded = get_incident(&ctx.pool, &outcome.incident.id)
        .await
        .expect("lookup")
        .expect("incident persisted");
    assert_eq!(loaded, outcome.incident);
    assert_eq!(loaded.url, "http://paypal-login.tk/verify");
}

#[tokio::test]
async fn test_clean_url_scan_is_quiet() {
    let pool = create_test_pool().await;
    let ctx = offline_context(pool);

    let outcome = comprehensive_scan("https://example.com", &ctx)
        .await
        .expect("scan");

    assert_eq!(outcome.assessment.verdict, Verdict::NoStrongSignals);
    assert!(outcome.assessment.red_flags.is_empty());
    assert_eq!(outcome.assessment.breakdown["structural_url_analysis"].sub_score, Some(0));
}

#[tokio::test]
async fn test_invalid_url_rejected_before_collectors_run() {
    let pool = create_test_pool().await;
    let ctx = offline_context(pool);

    let result = comprehensive_scan("not a url at all!!!", &ctx).await;
    assert!(matches!(result, Err(ScanError::InvalidUrl(_))));

    // Nothing was recorded for the rejected request.
    assert_eq!(ctx.stats.scans_completed(), 0);
    assert_eq!(ctx.stats.incidents_written(), 0);
}

#[tokio::test]
async fn test_unavailable_collectors_are_counted() {
    let pool = create_test_pool().await;
    let ctx = offline_context(pool);

    comprehensive_scan("https://example.com", &ctx)
        .await
        .expect("scan");

    assert_eq!(ctx.stats.scans_completed(), 1);
    assert_eq!(ctx.stats.degraded_scans(), 1);
    // Reputation has no providers configured, so it is always counted
    // unavailable in this environment.
    assert!(ctx.stats.unavailable_count(SignalSource::Reputation) >= 1);
}

#[tokio::test]
async fn test_breach_check_without_provider_degrades() {
    let pool = create_test_pool().await;
    let ctx = offline_context(pool);

    let result = service::breach_check(&ctx, "user@example.com")
        .await
        .expect("validation passes");
    assert!(!result.is_available());
    assert!(result.reason().unwrap().contains("no breach database"));
}

#[tokio::test]
async fn test_breach_check_rejects_invalid_email() {
    let pool = create_test_pool().await;
    let ctx = offline_context(pool);

    let result = service::breach_check(&ctx, "not-an-email").await;
    assert!(matches!(result, Err(ScanError::InvalidEmail(_))));
}

#[tokio::test]
async fn test_feedback_loop_through_service() {
    let pool = create_test_pool().await;
    let ctx = offline_context(pool);

    let data = service::security_scan(&ctx, "https://example.com")
        .await
        .expect("scan");

    let record = service::submit_feedback(&ctx, &data.incident_id, url_sentry::Judgment::Correct)
        .await
        .expect("feedback");
    assert_eq!(record.incident_id, data.incident_id);

    let stats = service::feedback_stats(&ctx).await.expect("stats");
    assert_eq!(stats.total, 1);
    assert_eq!(stats.accuracy, Some(1.0));
}
