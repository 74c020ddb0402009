//! Third-party domain reputation lookup.
//!
//! Queries every configured provider concurrently and folds their
//! verdicts: any malicious vote dominates, otherwise any suspicious vote
//! raises the floor. Providers are config data; with none configured the
//! signal degrades to `Unavailable` rather than inventing an answer.

use futures::future::join_all;
use serde::{Deserialize, Serialize};

use crate::config::ReputationProvider;
use crate::features::UrlFeatures;
use crate::pipeline::ScanContext;
use crate::signal::SignalResult;
use crate::utils::get_with_retry;

/// Normalized verdict shared across providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReputationVerdict {
    /// Provider had no record or no opinion.
    Unknown,
    /// Provider considers the domain clean.
    Clean,
    /// Provider reports elevated risk.
    Suspicious,
    /// Provider reports active abuse.
    Malicious,
}

impl ReputationVerdict {
    /// Stable wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReputationVerdict::Unknown => "unknown",
            ReputationVerdict::Clean => "clean",
            ReputationVerdict::Suspicious => "suspicious",
            ReputationVerdict::Malicious => "malicious",
        }
    }
}

/// One provider's answer, with the raw label it used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderVerdict {
    /// Provider name from configuration.
    pub provider: String,
    /// Normalized verdict.
    pub verdict: ReputationVerdict,
    /// The provider's own label, kept for explainability.
    pub raw_label: String,
}

/// Folded reputation outcome for one domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReputationSummary {
    /// Combined verdict across providers.
    pub combined: ReputationVerdict,
    /// Individual provider answers.
    pub provider_verdicts: Vec<ProviderVerdict>,
    /// Red flags emitted by this collector.
    pub flags: Vec<String>,
}

impl ReputationSummary {
    /// Source-specific sub-score.
    pub fn sub_score(&self) -> u8 {
        match self.combined {
            ReputationVerdict::Malicious => 95,
            ReputationVerdict::Suspicious => 60,
            ReputationVerdict::Unknown => 10,
            ReputationVerdict::Clean => 0,
        }
    }
}

/// Queries all configured reputation providers for the scanned domain.
pub async fn lookup_reputation(
    ctx: &ScanContext,
    features: &UrlFeatures,
) -> SignalResult<ReputationSummary> {
    let providers = &ctx.config.reputation_providers;
    if providers.is_empty() {
        return SignalResult::unavailable("no reputation providers configured");
    }

    let queries = providers
        .iter()
        .map(|provider| query_provider(ctx, provider, &features.domain));
    let answers: Vec<Option<ProviderVerdict>> = join_all(queries).await;

    let provider_verdicts: Vec<ProviderVerdict> = answers.into_iter().flatten().collect();
    if provider_verdicts.is_empty() {
        return SignalResult::unavailable(format!(
            "all {} reputation providers failed",
            providers.len()
        ));
    }

    let confidence = provider_verdicts.len() as f64 / providers.len() as f64;
    SignalResult::available(summarize(provider_verdicts), confidence)
}

/// Folds provider verdicts: any malicious vote dominates, else any
/// suspicious vote raises the floor.
fn summarize(provider_verdicts: Vec<ProviderVerdict>) -> ReputationSummary {
    let mut combined = ReputationVerdict::Unknown;
    let mut flags = Vec::new();

    for answer in &provider_verdicts {
        if answer.verdict > combined {
            combined = answer.verdict;
        }
        match answer.verdict {
            ReputationVerdict::Malicious => {
                if answer.raw_label.to_ascii_lowercase().contains("malware") {
                    flags.push(format!(
                        "provider {} flagged malware distribution",
                        answer.provider
                    ));
                } else {
                    flags.push(format!("flagged malicious by provider {}", answer.provider));
                }
            }
            ReputationVerdict::Suspicious => {
                flags.push(format!(
                    "flagged suspicious by provider {}",
                    answer.provider
                ));
            }
            _ => {}
        }
    }

    ReputationSummary {
        combined,
        provider_verdicts,
        flags,
    }
}

async fn query_provider(
    ctx: &ScanContext,
    provider: &ReputationProvider,
    domain: &str,
) -> Option<ProviderVerdict> {
    let endpoint = provider.endpoint.replace("{domain}", domain);
    let build = || {
        let mut request = ctx.client.get(&endpoint);
        if let Some(key) = &provider.api_key {
            request = request.header("x-api-key", key);
        }
        request
    };

    let response = match get_with_retry(build).await {
        Ok(response) => response,
        Err(e) => {
            log::warn!("Reputation provider {} failed: {e}", provider.name);
            return None;
        }
    };

    let body: serde_json::Value = match response.json().await {
        Ok(body) => body,
        Err(e) => {
            log::warn!(
                "Reputation provider {} returned unparsable body: {e}",
                provider.name
            );
            return None;
        }
    };

    let raw_label = ["verdict", "category", "status", "result"]
        .iter()
        .find_map(|key| body.get(*key).and_then(|v| v.as_str()))
        .unwrap_or("unknown")
        .to_string();

    Some(ProviderVerdict {
        provider: provider.name.clone(),
        verdict: normalize_verdict(&raw_label),
        raw_label,
    })
}

/// Maps a provider's own label onto the shared verdict scale.
fn normalize_verdict(raw: &str) -> ReputationVerdict {
    let label = raw.to_ascii_lowercase();
    if label.contains("malicious") || label.contains("malware") || label.contains("phishing") {
        ReputationVerdict::Malicious
    } else if label.contains("suspicious") || label.contains("medium") {
        ReputationVerdict::Suspicious
    } else if label.contains("clean") || label.contains("safe") || label.contains("harmless") {
        ReputationVerdict::Clean
    } else {
        ReputationVerdict::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(provider: &str, raw: &str) -> ProviderVerdict {
        ProviderVerdict {
            provider: provider.to_string(),
            verdict: normalize_verdict(raw),
            raw_label: raw.to_string(),
        }
    }

    #[test]
    fn test_normalize_verdict_labels() {
        assert_eq!(normalize_verdict("malicious"), ReputationVerdict::Malicious);
        assert_eq!(normalize_verdict("PHISHING"), ReputationVerdict::Malicious);
        assert_eq!(normalize_verdict("malware-hosting"), ReputationVerdict::Malicious);
        assert_eq!(normalize_verdict("suspicious"), ReputationVerdict::Suspicious);
        assert_eq!(normalize_verdict("clean"), ReputationVerdict::Clean);
        assert_eq!(normalize_verdict("no data"), ReputationVerdict::Unknown);
    }

    #[test]
    fn test_any_malicious_vote_dominates() {
        let summary = summarize(vec![
            answer("a", "clean"),
            answer("b", "malicious"),
            answer("c", "clean"),
        ]);
        assert_eq!(summary.combined, ReputationVerdict::Malicious);
        assert!(summary.flags.iter().any(|f| f.contains("provider b")));
        assert_eq!(summary.sub_score(), 95);
    }

    #[test]
    fn test_suspicious_vote_raises_floor_over_clean() {
        let summary = summarize(vec![answer("a", "clean"), answer("b", "suspicious")]);
        assert_eq!(summary.combined, ReputationVerdict::Suspicious);
        assert_eq!(summary.sub_score(), 60);
    }

    #[test]
    fn test_all_clean_is_clean() {
        let summary = summarize(vec![answer("a", "clean"), answer("b", "safe")]);
        assert_eq!(summary.combined, ReputationVerdict::Clean);
        assert!(summary.flags.is_empty());
        assert_eq!(summary.sub_score(), 0);
    }

    #[test]
    fn test_malware_label_emits_malware_flag() {
        let summary = summarize(vec![answer("vt", "malware")]);
        assert!(summary
            .flags
            .iter()
            .any(|f| f.contains("malware distribution")));
    }
}
