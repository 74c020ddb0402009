//! Domain registration age via RDAP.
//!
//! RDAP gives structured registration data over plain HTTPS, which is
//! all this signal needs: when was the domain registered, and is that
//! recent enough to be suspicious. Freshly registered domains are the
//! single strongest non-content phishing indicator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::features::UrlFeatures;
use crate::pipeline::ScanContext;
use crate::signal::SignalResult;
use crate::utils::get_with_retry;

/// Registration findings for one domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhoisAge {
    /// Registration (creation) date, when the registry published one.
    pub registered_at: Option<DateTime<Utc>>,
    /// Whole days since registration.
    pub age_in_days: Option<i64>,
    /// Registrar name, when published.
    pub registrar: Option<String>,
    /// Red flags emitted by this collector.
    pub flags: Vec<String>,
}

impl WhoisAge {
    /// Source-specific sub-score. Age bands, youngest scoring highest.
    pub fn sub_score(&self, young_threshold_days: i64) -> u8 {
        match self.age_in_days {
            Some(age) if age < 7 => 90,
            Some(age) if age < young_threshold_days => 70,
            Some(age) if age < 180 => 30,
            Some(_) => 0,
            None => 0,
        }
    }
}

/// Looks up registration data for the scanned domain over RDAP.
pub async fn check_whois(ctx: &ScanContext, features: &UrlFeatures) -> SignalResult<WhoisAge> {
    if features.is_ip {
        return SignalResult::unavailable("ip literal has no domain registration");
    }

    let endpoint = format!("{}{}", ctx.config.rdap_endpoint, features.domain);
    let response = match get_with_retry(|| ctx.client.get(&endpoint)).await {
        Ok(response) => response,
        Err(e) => {
            log::warn!("RDAP lookup failed for {}: {e}", features.domain);
            return SignalResult::unavailable(format!("rdap lookup failed: {e}"));
        }
    };

    let body: serde_json::Value = match response.json().await {
        Ok(body) => body,
        Err(e) => {
            log::warn!("RDAP response unparsable for {}: {e}", features.domain);
            return SignalResult::unavailable(format!("rdap response unparsable: {e}"));
        }
    };

    let age = parse_rdap(&body, ctx.config.young_domain_threshold_days, Utc::now());
    let confidence = if age.registered_at.is_some() { 0.9 } else { 0.4 };
    SignalResult::available(age, confidence)
}

/// Extracts registration age from an RDAP document. Pure; the clock is a
/// parameter so the age bands are testable.
fn parse_rdap(body: &serde_json::Value, young_threshold_days: i64, now: DateTime<Utc>) -> WhoisAge {
    let registered_at = body
        .get("events")
        .and_then(|events| events.as_array())
        .and_then(|events| {
            events.iter().find(|event| {
                event.get("eventAction").and_then(|a| a.as_str()) == Some("registration")
            })
        })
        .and_then(|event| event.get("eventDate"))
        .and_then(|date| date.as_str())
        .and_then(|date| DateTime::parse_from_rfc3339(date).ok())
        .map(|date| date.with_timezone(&Utc));

    let registrar = body
        .get("entities")
        .and_then(|entities| entities.as_array())
        .and_then(|entities| {
            entities.iter().find(|entity| {
                entity
                    .get("roles")
                    .and_then(|roles| roles.as_array())
                    .map(|roles| roles.iter().any(|r| r.as_str() == Some("registrar")))
                    .unwrap_or(false)
            })
        })
        .and_then(extract_vcard_fn);

    let age_in_days = registered_at.map(|date| (now - date).num_days());
    let mut flags = Vec::new();
    if let Some(age) = age_in_days {
        if age < young_threshold_days {
            flags.push(format!("domain registered only {age} day(s) ago"));
        }
    }

    WhoisAge {
        registered_at,
        age_in_days,
        registrar,
        flags,
    }
}

/// Pulls the formatted name out of an RDAP entity's jCard, if present.
fn extract_vcard_fn(entity: &serde_json::Value) -> Option<String> {
    entity
        .get("vcardArray")?
        .as_array()?
        .get(1)?
        .as_array()?
        .iter()
        .find_map(|prop| {
            let prop = prop.as_array()?;
            if prop.first()?.as_str()? == "fn" {
                prop.get(3)?.as_str().map(str::to_string)
            } else {
                None
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn rdap_doc(event_date: &str) -> serde_json::Value {
        serde_json::json!({
            "events": [
                { "eventAction": "last changed", "eventDate": "2020-06-01T00:00:00Z" },
                { "eventAction": "registration", "eventDate": event_date }
            ],
            "entities": [
                {
                    "roles": ["registrar"],
                    "vcardArray": ["vcard", [["fn", {}, "text", "Example Registrar Inc."]]]
                }
            ]
        })
    }

    #[test]
    fn test_parse_rdap_registration_age() {
        let now = Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap();
        let age = parse_rdap(&rdap_doc("2026-07-22T00:00:00Z"), 30, now);
        assert_eq!(age.age_in_days, Some(10));
        assert!(age.flags.iter().any(|f| f.contains("10 day(s) ago")));
        assert_eq!(age.registrar.as_deref(), Some("Example Registrar Inc."));
    }

    #[test]
    fn test_old_domain_is_not_flagged() {
        let now = Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap();
        let age = parse_rdap(&rdap_doc("2010-01-15T00:00:00Z"), 30, now);
        assert!(age.flags.is_empty());
        assert_eq!(age.sub_score(30), 0);
    }

    #[test]
    fn test_age_bands() {
        let base = WhoisAge {
            registered_at: None,
            age_in_days: None,
            registrar: None,
            flags: Vec::new(),
        };
        assert_eq!(WhoisAge { age_in_days: Some(3), ..base.clone() }.sub_score(30), 90);
        assert_eq!(WhoisAge { age_in_days: Some(20), ..base.clone() }.sub_score(30), 70);
        assert_eq!(WhoisAge { age_in_days: Some(100), ..base.clone() }.sub_score(30), 30);
        assert_eq!(WhoisAge { age_in_days: Some(400), ..base.clone() }.sub_score(30), 0);
        assert_eq!(base.sub_score(30), 0);
    }

    #[test]
    fn test_missing_events_yields_no_date() {
        let age = parse_rdap(&serde_json::json!({}), 30, Utc::now());
        assert!(age.registered_at.is_none());
        assert!(age.age_in_days.is_none());
        assert!(age.flags.is_empty());
    }
}
