//! Signal source identity and the partial-result type shared by all
//! collectors.
//!
//! Every collector produces a `SignalResult`: either a value with a
//! confidence, or an explicit reason it could not answer. The aggregator
//! must tolerate any mix of the two, so nothing in this module can fail.

use serde::{Deserialize, Serialize};
use strum_macros::EnumIter as EnumIterMacro;

/// Identity of one signal source contributing to a risk assessment.
///
/// The variant order is the collector invocation order, which also fixes
/// the order red flags are concatenated in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIterMacro,
)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    /// Structural URL analysis (computed, no network).
    Structural,
    /// Redirect chain resolution.
    Redirects,
    /// Page content and form inspection.
    PageContent,
    /// TLS posture audit.
    Tls,
    /// Third-party domain reputation.
    Reputation,
    /// WHOIS/RDAP registration age.
    Whois,
    /// Resolved-IP risk profile.
    IpRisk,
    /// Credential-breach history (email-keyed).
    Breach,
}

impl SignalSource {
    /// Stable name used as the breakdown key and in log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalSource::Structural => "structural_url_analysis",
            SignalSource::Redirects => "redirect_chain",
            SignalSource::PageContent => "page_content",
            SignalSource::Tls => "tls_posture",
            SignalSource::Reputation => "domain_reputation",
            SignalSource::Whois => "whois_age",
            SignalSource::IpRisk => "ip_risk",
            SignalSource::Breach => "breach_history",
        }
    }

    /// Layer-B membership: sources backed by external threat
    /// intelligence. An incident is SIEM-ready only when at least one of
    /// these answered.
    pub fn is_threat_intel(&self) -> bool {
        matches!(
            self,
            SignalSource::Reputation
                | SignalSource::Whois
                | SignalSource::IpRisk
                | SignalSource::Breach
        )
    }

    /// Dense index used for per-source counters.
    pub(crate) fn index(&self) -> usize {
        *self as usize
    }

    /// Number of defined sources.
    pub(crate) const COUNT: usize = 8;
}

impl std::fmt::Display for SignalSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single collector invocation.
///
/// Collectors never propagate errors past their boundary; a network
/// failure, a timeout, or missing provider configuration all become
/// `Unavailable` with a human-readable reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SignalResult<T> {
    /// The collector answered.
    Available {
        /// Collector-specific payload.
        value: T,
        /// How much the collector trusts its own answer, 0.0..=1.0.
        confidence: f64,
    },
    /// The collector could not answer within its budget.
    Unavailable {
        /// Human-readable reason, recorded in the breakdown.
        reason: String,
    },
}

impl<T> SignalResult<T> {
    /// Builds an `Available` result, clamping confidence into 0.0..=1.0.
    pub fn available(value: T, confidence: f64) -> Self {
        SignalResult::Available {
            value,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Builds an `Unavailable` result.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        SignalResult::Unavailable {
            reason: reason.into(),
        }
    }

    /// True when the collector answered.
    pub fn is_available(&self) -> bool {
        matches!(self, SignalResult::Available { .. })
    }

    /// The payload, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            SignalResult::Available { value, .. } => Some(value),
            SignalResult::Unavailable { .. } => None,
        }
    }

    /// The unavailability reason, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            SignalResult::Available { .. } => None,
            SignalResult::Unavailable { reason } => Some(reason),
        }
    }

    /// Maps the payload, preserving confidence or reason.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> SignalResult<U> {
        match self {
            SignalResult::Available { value, confidence } => SignalResult::Available {
                value: f(value),
                confidence,
            },
            SignalResult::Unavailable { reason } => SignalResult::Unavailable { reason },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_source_names_are_unique_and_nonempty() {
        let names: Vec<&str> = SignalSource::iter().map(|s| s.as_str()).collect();
        assert_eq!(names.len(), SignalSource::COUNT);
        for name in &names {
            assert!(!name.is_empty());
        }
        let mut deduped = names.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), names.len());
    }

    #[test]
    fn test_threat_intel_layer_membership() {
        assert!(SignalSource::Reputation.is_threat_intel());
        assert!(SignalSource::Whois.is_threat_intel());
        assert!(SignalSource::IpRisk.is_threat_intel());
        assert!(SignalSource::Breach.is_threat_intel());
        assert!(!SignalSource::Structural.is_threat_intel());
        assert!(!SignalSource::Tls.is_threat_intel());
    }

    #[test]
    fn test_signal_result_confidence_clamped() {
        let r = SignalResult::available(1u8, 3.5);
        match r {
            SignalResult::Available { confidence, .. } => assert_eq!(confidence, 1.0),
            _ => panic!("expected available"),
        }
    }

    #[test]
    fn test_signal_result_map_preserves_reason() {
        let r: SignalResult<u8> = SignalResult::unavailable("timed out");
        let mapped = r.map(|v| v as u32);
        assert_eq!(mapped.reason(), Some("timed out"));
        assert!(!mapped.is_available());
    }

    #[test]
    fn test_signal_result_serialization_shape() {
        let r = SignalResult::available(7u8, 0.9);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["status"], "available");
        assert_eq!(json["value"], 7);

        let r: SignalResult<u8> = SignalResult::unavailable("no provider");
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["status"], "unavailable");
        assert_eq!(json["reason"], "no provider");
    }
}
