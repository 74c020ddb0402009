//! Risk aggregation.
//!
//! Merges the settled collector outputs into one 0-100 score and a
//! verdict. Unavailable sources are excluded from the weight denominator
//! (the score is renormalized over the sources that answered) instead of
//! being counted as zero risk: missing data must not look like safety,
//! and an outage must not look like an attack.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{
    SIMPLE_PHISHING_FLAGS, SIMPLE_SUSPICIOUS_FLAGS, VERDICT_PHISHING_FLOOR,
    VERDICT_SUSPICIOUS_FLOOR,
};
use crate::signal::SignalSource;

/// Coarse risk classification derived from the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Nothing crossed a reporting threshold.
    NoStrongSignals,
    /// Elevated risk, human review advised.
    Suspicious,
    /// Strong phishing indicators.
    LikelyPhishing,
}

impl Verdict {
    /// Stable wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::NoStrongSignals => "no_strong_signals",
            Verdict::Suspicious => "suspicious",
            Verdict::LikelyPhishing => "likely_phishing",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One source's settled input to the aggregator.
#[derive(Debug, Clone)]
pub struct Contribution {
    /// Which source this is.
    pub source: SignalSource,
    /// Configured weight for this source.
    pub weight: u32,
    /// Scored sub-result or the reason the source is missing.
    pub outcome: Outcome,
}

/// Settled outcome of one source.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The source answered with a 0-100 sub-score and its red flags.
    Scored {
        /// Source-specific sub-score, 0-100.
        sub_score: u8,
        /// Red flags emitted by the source, in detection order.
        flags: Vec<String>,
    },
    /// The source did not answer.
    Missing {
        /// Why the source is missing; recorded in the breakdown.
        reason: String,
    },
}

impl Contribution {
    /// Convenience constructor for an answered source using its
    /// configured weight.
    pub fn scored(source: SignalSource, sub_score: u8, flags: Vec<String>) -> Self {
        Contribution {
            source,
            weight: weight_for(source),
            outcome: Outcome::Scored { sub_score, flags },
        }
    }

    /// Convenience constructor for a missing source using its configured
    /// weight.
    pub fn missing(source: SignalSource, reason: impl Into<String>) -> Self {
        Contribution {
            source,
            weight: weight_for(source),
            outcome: Outcome::Missing {
                reason: reason.into(),
            },
        }
    }
}

/// Per-source entry in the assessment breakdown. Present for every source
/// that took part in the scan, including the ones that did not answer
/// (recorded with zero effective weight and the reason).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    /// Weight actually applied: the configured weight when the source
    /// answered, zero otherwise.
    pub weight: u32,
    /// Sub-score when the source answered.
    pub sub_score: Option<u8>,
    /// Unavailability reason or other note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// The aggregate output of one scan. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Combined score, 0-100.
    pub overall_score: u8,
    /// Verdict band for the score.
    pub verdict: Verdict,
    /// Per-source contribution map keyed by source name.
    pub breakdown: BTreeMap<String, BreakdownEntry>,
    /// Deduplicated red flags in detection order (first occurrence wins).
    pub red_flags: Vec<String>,
}

/// Fixed weight table. Weights sum to 100; the sum is only a
/// normalization constant, renormalization handles any subset of
/// answered sources.
pub fn weight_for(source: SignalSource) -> u32 {
    match source {
        SignalSource::Structural => 25,
        SignalSource::Redirects => 5,
        SignalSource::PageContent => 10,
        SignalSource::Tls => 10,
        SignalSource::Reputation => 25,
        SignalSource::Whois => 10,
        SignalSource::IpRisk => 5,
        SignalSource::Breach => 10,
    }
}

/// Maps a structural red-flag count to its sub-score via the fixed step
/// function.
pub fn structural_sub_score(flag_count: usize) -> u8 {
    match flag_count {
        0 => 0,
        1 => 40,
        2 => 70,
        _ => 90,
    }
}

/// Verdict band for a comprehensive-scan score. Exact boundaries take the
/// more severe label.
pub fn verdict_for(score: u8) -> Verdict {
    if score >= VERDICT_PHISHING_FLOOR {
        Verdict::LikelyPhishing
    } else if score >= VERDICT_SUSPICIOUS_FLOOR {
        Verdict::Suspicious
    } else {
        Verdict::NoStrongSignals
    }
}

/// Verdict for the URL-only scoring path. This policy is flag-count
/// driven and deliberately configured apart from the comprehensive bands.
pub fn simple_verdict(flag_count: usize) -> Verdict {
    if flag_count >= SIMPLE_PHISHING_FLAGS {
        Verdict::LikelyPhishing
    } else if flag_count >= SIMPLE_SUSPICIOUS_FLAGS {
        Verdict::Suspicious
    } else {
        Verdict::NoStrongSignals
    }
}

/// Combines settled contributions into a `RiskAssessment`.
///
/// Red flags are concatenated in the order contributions are passed
/// (collector invocation order), deduplicated by exact string with the
/// first occurrence winning. When every source is missing the result is
/// the explicit insufficient-data verdict, never a fabricated score.
pub fn aggregate(contributions: &[Contribution]) -> RiskAssessment {
    let mut breakdown = BTreeMap::new();
    let mut red_flags: Vec<String> = Vec::new();
    let mut weighted_sum: u64 = 0;
    let mut weight_total: u64 = 0;

    for contribution in contributions {
        let key = contribution.source.as_str().to_string();
        match &contribution.outcome {
            Outcome::Scored { sub_score, flags } => {
                weighted_sum += contribution.weight as u64 * *sub_score as u64;
                weight_total += contribution.weight as u64;
                for flag in flags {
                    if !red_flags.contains(flag) {
                        red_flags.push(flag.clone());
                    }
                }
                breakdown.insert(
                    key,
                    BreakdownEntry {
                        weight: contribution.weight,
                        sub_score: Some(*sub_score),
                        note: None,
                    },
                );
            }
            Outcome::Missing { reason } => {
                breakdown.insert(
                    key,
                    BreakdownEntry {
                        weight: 0,
                        sub_score: None,
                        note: Some(reason.clone()),
                    },
                );
            }
        }
    }

    if weight_total == 0 {
        log::warn!("All signal sources unavailable; returning insufficient-data verdict");
        breakdown.insert(
            "aggregate".to_string(),
            BreakdownEntry {
                weight: 0,
                sub_score: None,
                note: Some("insufficient data: no signal source answered".to_string()),
            },
        );
        return RiskAssessment {
            overall_score: 0,
            verdict: Verdict::NoStrongSignals,
            breakdown,
            red_flags,
        };
    }

    // Integer rounding of weighted_sum / weight_total.
    let overall_score = ((weighted_sum + weight_total / 2) / weight_total) as u8;

    RiskAssessment {
        overall_score,
        verdict: verdict_for(overall_score),
        breakdown,
        red_flags,
    }
}
