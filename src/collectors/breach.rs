//! Credential-breach history lookup.
//!
//! The one collector keyed by an email rather than a URL. Queries the
//! configured breach database (HIBP-shaped JSON) and summarizes how
//! exposed the address is and whether the exposure includes passwords or
//! financial data.

use serde::{Deserialize, Serialize};

use crate::pipeline::ScanContext;
use crate::signal::SignalResult;
use crate::utils::get_with_retry;

/// Breach exposure summary for one email address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreachHistory {
    /// Number of known breaches the address appears in.
    pub breach_count: usize,
    /// Sum of exposed-record counts across those breaches.
    pub total_exposed_records: u64,
    /// Passwords were among the exposed data classes.
    pub passwords_exposed: bool,
    /// Financial data was among the exposed data classes.
    pub financial_data_exposed: bool,
    /// Names of the breaches, for the report.
    pub breach_names: Vec<String>,
    /// Red flags emitted by this collector.
    pub flags: Vec<String>,
}

impl BreachHistory {
    /// Source-specific sub-score.
    pub fn sub_score(&self) -> u8 {
        if self.breach_count == 0 {
            0
        } else if self.passwords_exposed || self.financial_data_exposed {
            85
        } else {
            55
        }
    }
}

/// Shape of one breach entry as returned by HIBP-compatible services.
#[derive(Debug, Deserialize)]
struct BreachEntry {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "PwnCount", default)]
    pwn_count: u64,
    #[serde(rename = "DataClasses", default)]
    data_classes: Vec<String>,
}

/// Queries the configured breach database for an already-validated email
/// address.
pub async fn check_breaches(ctx: &ScanContext, email: &str) -> SignalResult<BreachHistory> {
    let Some(endpoint) = &ctx.config.breach_endpoint else {
        return SignalResult::unavailable("no breach database configured");
    };
    let endpoint = endpoint.replace("{email}", email);

    let build = || {
        let mut request = ctx.client.get(&endpoint);
        if let Some(key) = &ctx.config.breach_api_key {
            request = request.header("hibp-api-key", key);
        }
        request
    };

    let response = match get_with_retry(build).await {
        Ok(response) => response,
        Err(e) => {
            // HIBP answers 404 for an address with no breaches; that is
            // data, not an outage.
            if e.status() == Some(reqwest::StatusCode::NOT_FOUND) {
                return SignalResult::available(BreachHistory::default(), 0.9);
            }
            log::warn!("Breach lookup failed: {e}");
            return SignalResult::unavailable(format!("breach lookup failed: {e}"));
        }
    };

    let entries: Vec<BreachEntry> = match response.json().await {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Breach response unparsable: {e}");
            return SignalResult::unavailable(format!("breach response unparsable: {e}"));
        }
    };

    SignalResult::available(summarize(entries), 0.9)
}

impl Default for BreachHistory {
    fn default() -> Self {
        BreachHistory {
            breach_count: 0,
            total_exposed_records: 0,
            passwords_exposed: false,
            financial_data_exposed: false,
            breach_names: Vec::new(),
            flags: Vec::new(),
        }
    }
}

fn summarize(entries: Vec<BreachEntry>) -> BreachHistory {
    let mut history = BreachHistory {
        breach_count: entries.len(),
        ..BreachHistory::default()
    };

    for entry in &entries {
        history.total_exposed_records = history.total_exposed_records.saturating_add(entry.pwn_count);
        for class in &entry.data_classes {
            let class = class.to_ascii_lowercase();
            if class.contains("password") {
                history.passwords_exposed = true;
            }
            if class.contains("credit") || class.contains("bank") || class.contains("financial") {
                history.financial_data_exposed = true;
            }
        }
        history.breach_names.push(entry.name.clone());
    }

    if history.breach_count > 0 {
        history.flags.push(format!(
            "email appears in {} known breach(es)",
            history.breach_count
        ));
    }
    if history.passwords_exposed {
        history
            .flags
            .push("passwords exposed in breached data".to_string());
    }
    if history.financial_data_exposed {
        history
            .flags
            .push("financial data exposed in breached data".to_string());
    }

    history
}
