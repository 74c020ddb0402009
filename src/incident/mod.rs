//! Incident report generation.
//!
//! Every completed scan becomes exactly one immutable `IncidentReport`.
//! Ids are time-ordered (millisecond prefix) with a random suffix for
//! collision resistance; the storage layer enforces uniqueness.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::RiskAssessment;
use crate::classify::Category;
use crate::config::DICTIONARY_VERSION;
use crate::signal::SignalSource;

/// Persisted record of one completed scan. Never mutated; deletion is an
/// external retention concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentReport {
    /// Unique, time-ordered id (`inc_<millis>_<rand>`).
    pub id: String,
    /// UTC time the incident was generated.
    pub timestamp: DateTime<Utc>,
    /// The scanned URL (normalized form).
    pub url: String,
    /// The full assessment that produced this incident.
    pub risk_assessment: RiskAssessment,
    /// Assigned category.
    pub category: Category,
    /// Free-form key/value metadata.
    pub metadata: BTreeMap<String, String>,
    /// True when the scan had minimum signal coverage (at least one
    /// threat-intelligence source answered), making the record suitable
    /// for SIEM forwarding.
    pub siem_ready: bool,
}

/// Generates a fresh, unique, time-ordered incident id.
///
/// The zero-padded millisecond prefix keeps lexicographic order equal to
/// time order; the random suffix keeps concurrent scans from colliding.
pub fn new_incident_id() -> String {
    format!(
        "inc_{:013}_{:08x}",
        Utc::now().timestamp_millis(),
        rand::random::<u32>()
    )
}

/// Builds an incident report for a completed scan.
///
/// `answered_sources` is the set of sources that produced a value;
/// `siem_ready` is derived from its threat-intelligence subset.
pub fn generate(
    url: &str,
    risk_assessment: RiskAssessment,
    category: Category,
    answered_sources: &[SignalSource],
) -> IncidentReport {
    let siem_ready = answered_sources.iter().any(SignalSource::is_threat_intel);
    let mut metadata = BTreeMap::new();
    metadata.insert(
        "dictionary_version".to_string(),
        DICTIONARY_VERSION.to_string(),
    );
    metadata.insert(
        "engine_version".to_string(),
        env!("CARGO_PKG_VERSION").to_string(),
    );
    metadata.insert(
        "sources_answered".to_string(),
        answered_sources
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(","),
    );

    // Truncate to millisecond precision so the stored record round-trips
    // exactly (created_at is persisted as epoch milliseconds).
    let now = Utc::now();
    let timestamp = DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now);

    IncidentReport {
        id: new_incident_id(),
        timestamp,
        url: url.to_string(),
        risk_assessment,
        category,
        metadata,
        siem_ready,
    }
}
