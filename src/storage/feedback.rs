//! Feedback persistence and aggregation.
//!
//! Human corrections are appended against an existing incident id and
//! rolled up into accuracy statistics. Zero feedback is a valid state and
//! reports its accuracy as absent, not as zero.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Row, Sqlite};
use strum_macros::{Display, EnumString};

use crate::error_handling::ScanError;

/// Human judgment on a persisted incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Judgment {
    /// The verdict was right.
    Correct,
    /// The scan flagged a benign URL.
    FalsePositive,
    /// The scan missed a malicious URL.
    FalseNegative,
}

/// One appended feedback entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    /// Row id assigned by the store.
    pub id: i64,
    /// The incident this feedback corrects.
    pub incident_id: String,
    /// The human judgment.
    pub judgment: Judgment,
    /// UTC time the feedback was recorded.
    pub created_at: DateTime<Utc>,
}

/// Rolling accuracy statistics over all stored feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackStats {
    /// Count of `correct` judgments.
    pub correct: u64,
    /// Count of `false_positive` judgments.
    pub false_positive: u64,
    /// Count of `false_negative` judgments.
    pub false_negative: u64,
    /// Total feedback entries.
    pub total: u64,
    /// `correct / total`; absent when no feedback exists.
    pub accuracy: Option<f64>,
}

/// Appends a judgment against an incident. Fails with `UnknownIncident`
/// when the id does not resolve to a stored report.
pub async fn record_feedback(
    pool: &Pool<Sqlite>,
    incident_id: &str,
    judgment: Judgment,
) -> Result<FeedbackRecord, ScanError> {
    let exists = sqlx::query("SELECT 1 FROM incidents WHERE id = ?")
        .bind(incident_id)
        .fetch_optional(pool)
        .await?
        .is_some();
    if !exists {
        return Err(ScanError::UnknownIncident(incident_id.to_string()));
    }

    let now = Utc::now();
    let created_at_millis = now.timestamp_millis();
    let row = sqlx::query(
        "INSERT INTO feedback (incident_id, judgment, created_at) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(incident_id)
    .bind(judgment.to_string())
    .bind(created_at_millis)
    .fetch_one(pool)
    .await?;

    Ok(FeedbackRecord {
        id: row.get::<i64, _>(0),
        incident_id: incident_id.to_string(),
        judgment,
        created_at: DateTime::from_timestamp_millis(created_at_millis).unwrap_or(now),
    })
}

/// Aggregates counts per judgment type and the rolling accuracy ratio.
pub async fn feedback_stats(pool: &Pool<Sqlite>) -> Result<FeedbackStats, ScanError> {
    let rows = sqlx::query("SELECT judgment, COUNT(*) AS n FROM feedback GROUP BY judgment")
        .fetch_all(pool)
        .await?;

    let mut stats = FeedbackStats {
        correct: 0,
        false_positive: 0,
        false_negative: 0,
        total: 0,
        accuracy: None,
    };
    for row in rows {
        let judgment_str: String = row.get("judgment");
        let count: i64 = row.get("n");
        let count = count.max(0) as u64;
        match Judgment::from_str(&judgment_str) {
            Ok(Judgment::Correct) => stats.correct = count,
            Ok(Judgment::FalsePositive) => stats.false_positive = count,
            Ok(Judgment::FalseNegative) => stats.false_negative = count,
            Err(_) => log::warn!("Ignoring unknown judgment value in store: {judgment_str}"),
        }
    }
    stats.total = stats.correct + stats.false_positive + stats.false_negative;
    // No data is not the same as zero accuracy.
    if stats.total > 0 {
        stats.accuracy = Some(stats.correct as f64 / stats.total as f64);
    }
    Ok(stats)
}
