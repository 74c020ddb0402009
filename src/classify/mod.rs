//! Category and policy classification.
//!
//! A pure function of the extracted features and the finished assessment.
//! The policy table is configuration data: changing an outcome means
//! editing a row, not logic.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::aggregate::{RiskAssessment, Verdict};
use crate::features::UrlFeatures;

/// Risk category assigned to a scanned URL.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    /// Credential-harvesting indicators dominate.
    Phishing,
    /// A reputation source reported malware distribution.
    Malware,
    /// No elevated signals.
    Benign,
    /// Elevated but inconclusive.
    Unknown,
}

/// One row of the policy table: a category plus an inclusive score band
/// mapped to a compliance outcome.
#[derive(Debug, Clone, Copy)]
pub struct PolicyRule {
    /// Category the rule applies to.
    pub category: Category,
    /// Inclusive lower score bound.
    pub min_score: u8,
    /// Inclusive upper score bound.
    pub max_score: u8,
    /// Whether a URL in this band complies with policy.
    pub compliant: bool,
}

/// Policy table evaluated top to bottom; first match wins. Anything that
/// falls through is non-compliant.
pub const POLICY_TABLE: &[PolicyRule] = &[
    PolicyRule {
        category: Category::Benign,
        min_score: 0,
        max_score: 100,
        compliant: true,
    },
    PolicyRule {
        category: Category::Unknown,
        min_score: 0,
        max_score: 59,
        compliant: true,
    },
    PolicyRule {
        category: Category::Unknown,
        min_score: 60,
        max_score: 100,
        compliant: false,
    },
    PolicyRule {
        category: Category::Phishing,
        min_score: 0,
        max_score: 100,
        compliant: false,
    },
    PolicyRule {
        category: Category::Malware,
        min_score: 0,
        max_score: 100,
        compliant: false,
    },
];

/// Buckets a scan into a category and evaluates the policy table.
/// Deterministic: same inputs, same outputs, no hidden state.
pub fn classify(features: &UrlFeatures, assessment: &RiskAssessment) -> (Category, bool) {
    let category = categorize(features, assessment);
    (category, policy_compliant(category, assessment.overall_score))
}

fn categorize(features: &UrlFeatures, assessment: &RiskAssessment) -> Category {
    // A malware report from a reputation source outranks the phishing
    // heuristics.
    if assessment
        .red_flags
        .iter()
        .any(|flag| flag.contains("malware"))
    {
        return Category::Malware;
    }
    match assessment.verdict {
        Verdict::LikelyPhishing => Category::Phishing,
        Verdict::Suspicious => {
            if features.brand_impersonation.is_some() && !features.keyword_hits.is_empty() {
                Category::Phishing
            } else {
                Category::Unknown
            }
        }
        Verdict::NoStrongSignals => {
            if assessment.red_flags.is_empty() {
                Category::Benign
            } else {
                Category::Unknown
            }
        }
    }
}

/// Looks up the compliance outcome for a (category, score) pair.
pub fn policy_compliant(category: Category, score: u8) -> bool {
    POLICY_TABLE
        .iter()
        .find(|rule| {
            rule.category == category && score >= rule.min_score && score <= rule.max_score
        })
        .map(|rule| rule.compliant)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{aggregate, structural_sub_score, Contribution};
    use crate::features::{extract, structural_flags};
    use crate::signal::SignalSource;

    fn assess(url: &str) -> (UrlFeatures, RiskAssessment) {
        let features = extract(url).unwrap();
        let flags = structural_flags(&features);
        let assessment = aggregate(&[Contribution::scored(
            SignalSource::Structural,
            structural_sub_score(flags.len()),
            flags,
        )]);
        (features, assessment)
    }

    #[test]
    fn test_clean_url_is_benign_and_compliant() {
        let (features, assessment) = assess("https://example.com");
        let (category, compliant) = classify(&features, &assessment);
        assert_eq!(category, Category::Benign);
        assert!(compliant);
    }

    #[test]
    fn test_phishy_url_is_phishing_and_noncompliant() {
        let (features, assessment) = assess("http://192.168.1.1@paypal-login.tk/verify");
        assert_eq!(assessment.verdict, Verdict::LikelyPhishing);
        let (category, compliant) = classify(&features, &assessment);
        assert_eq!(category, Category::Phishing);
        assert!(!compliant);
    }

    #[test]
    fn test_malware_flag_dominates() {
        let (features, mut assessment) = assess("https://example.com");
        assessment
            .red_flags
            .push("provider x flagged malware distribution".to_string());
        let (category, compliant) = classify(&features, &assessment);
        assert_eq!(category, Category::Malware);
        assert!(!compliant);
    }

    #[test]
    fn test_unknown_band_splits_on_score() {
        assert!(policy_compliant(Category::Unknown, 59));
        assert!(!policy_compliant(Category::Unknown, 60));
    }

    #[test]
    fn test_classification_is_deterministic() {
        let (features, assessment) = assess("https://secure-update.example.xyz/login");
        let first = classify(&features, &assessment);
        let second = classify(&features, &assessment);
        assert_eq!(first, second);
    }
}
