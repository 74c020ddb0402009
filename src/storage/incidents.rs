//! Append-only incident persistence.
//!
//! One row per completed scan, keyed by the generated incident id. The
//! table's primary key is the integrity boundary: an id collision is
//! surfaced as `DuplicateIncident`, never resolved by overwriting.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::DateTime;
use sqlx::{Pool, Row, Sqlite};

use crate::aggregate::RiskAssessment;
use crate::classify::Category;
use crate::error_handling::ScanError;
use crate::incident::IncidentReport;

/// Inserts an incident report. Atomic create-if-absent on the id; a
/// duplicate id fails with `DuplicateIncident`.
pub async fn insert_incident(
    pool: &Pool<Sqlite>,
    report: &IncidentReport,
) -> Result<(), ScanError> {
    let assessment_json = serde_json::to_string(&report.risk_assessment)
        .map_err(|e| ScanError::CorruptRecord(format!("assessment serialization: {e}")))?;
    let metadata_json = serde_json::to_string(&report.metadata)
        .map_err(|e| ScanError::CorruptRecord(format!("metadata serialization: {e}")))?;

    let result = sqlx::query(
        "INSERT INTO incidents (id, created_at, url, category, siem_ready, assessment_json, metadata_json)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&report.id)
    .bind(report.timestamp.timestamp_millis())
    .bind(&report.url)
    .bind(report.category.to_string())
    .bind(report.siem_ready)
    .bind(&assessment_json)
    .bind(&metadata_json)
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Err(ScanError::DuplicateIncident(report.id.clone()))
        }
        Err(e) => Err(ScanError::Database(e)),
    }
}

/// Loads an incident by id. Returns `None` when the id is unknown.
pub async fn get_incident(
    pool: &Pool<Sqlite>,
    id: &str,
) -> Result<Option<IncidentReport>, ScanError> {
    let row = sqlx::query(
        "SELECT id, created_at, url, category, siem_ready, assessment_json, metadata_json
         FROM incidents WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(row_to_report).transpose()
}

/// Lists the most recent incidents, newest first.
pub async fn recent_incidents(
    pool: &Pool<Sqlite>,
    limit: u32,
) -> Result<Vec<IncidentReport>, ScanError> {
    let rows = sqlx::query(
        "SELECT id, created_at, url, category, siem_ready, assessment_json, metadata_json
         FROM incidents ORDER BY created_at DESC, id DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(row_to_report).collect()
}

fn row_to_report(row: sqlx::sqlite::SqliteRow) -> Result<IncidentReport, ScanError> {
    let assessment_json: String = row.get("assessment_json");
    let metadata_json: String = row.get("metadata_json");
    let risk_assessment: RiskAssessment = serde_json::from_str(&assessment_json)
        .map_err(|e| ScanError::CorruptRecord(format!("assessment: {e}")))?;
    let metadata: BTreeMap<String, String> = serde_json::from_str(&metadata_json)
        .map_err(|e| ScanError::CorruptRecord(format!("metadata: {e}")))?;

    let category_str: String = row.get("category");
    let category = Category::from_str(&category_str)
        .map_err(|e| ScanError::CorruptRecord(format!("category '{category_str}': {e}")))?;

    let created_at: i64 = row.get("created_at");
    let timestamp = DateTime::from_timestamp_millis(created_at).ok_or_else(|| {
        ScanError::CorruptRecord(format!("invalid created_at timestamp: {created_at}"))
    })?;

    Ok(IncidentReport {
        id: row.get("id"),
        timestamp,
        url: row.get("url"),
        risk_assessment,
        category,
        metadata,
        siem_ready: row.get("siem_ready"),
    })
}
