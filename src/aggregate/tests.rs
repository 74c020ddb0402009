use super::*;

fn scored(source: SignalSource, weight: u32, sub_score: u8) -> Contribution {
    Contribution {
        source,
        weight,
        outcome: Outcome::Scored {
            sub_score,
            flags: Vec::new(),
        },
    }
}

fn missing(source: SignalSource, weight: u32) -> Contribution {
    Contribution {
        source,
        weight,
        outcome: Outcome::Missing {
            reason: "timed out".to_string(),
        },
    }
}

#[test]
fn test_structural_step_function() {
    assert_eq!(structural_sub_score(0), 0);
    assert_eq!(structural_sub_score(1), 40);
    assert_eq!(structural_sub_score(2), 70);
    assert_eq!(structural_sub_score(3), 90);
    assert_eq!(structural_sub_score(10), 90);
}

#[test]
fn test_verdict_bands_with_severe_boundaries() {
    assert_eq!(verdict_for(0), Verdict::NoStrongSignals);
    assert_eq!(verdict_for(29), Verdict::NoStrongSignals);
    // Exact boundaries take the more severe label.
    assert_eq!(verdict_for(30), Verdict::Suspicious);
    assert_eq!(verdict_for(59), Verdict::Suspicious);
    assert_eq!(verdict_for(60), Verdict::LikelyPhishing);
    assert_eq!(verdict_for(100), Verdict::LikelyPhishing);
}

#[test]
fn test_simple_policy_is_flag_count_driven() {
    assert_eq!(simple_verdict(0), Verdict::NoStrongSignals);
    assert_eq!(simple_verdict(1), Verdict::Suspicious);
    assert_eq!(simple_verdict(2), Verdict::LikelyPhishing);
    assert_eq!(simple_verdict(5), Verdict::LikelyPhishing);
}

#[test]
fn test_renormalization_over_answered_sources() {
    // Weights {40, 30, 30}; the 30-weight reputation source is missing.
    // Expected: (40*s1 + 30*s3) / 70, independent of the missing weight.
    let contributions = vec![
        scored(SignalSource::Structural, 40, 90),
        missing(SignalSource::Reputation, 30),
        scored(SignalSource::Whois, 30, 20),
    ];
    let assessment = aggregate(&contributions);
    // (40*90 + 30*20) / 70 = 4200 / 70 = 60
    assert_eq!(assessment.overall_score, 60);
    assert_eq!(assessment.verdict, Verdict::LikelyPhishing);

    let whois_entry = &assessment.breakdown["whois_age"];
    assert_eq!(whois_entry.weight, 30);
    let missing_entry = &assessment.breakdown["domain_reputation"];
    assert_eq!(missing_entry.weight, 0);
    assert_eq!(missing_entry.sub_score, None);
    assert!(missing_entry.note.as_deref().unwrap().contains("timed out"));
}

#[test]
fn test_missing_source_does_not_dilute_score() {
    // A single answered source at 80 must score 80 regardless of how many
    // other sources are missing.
    let contributions = vec![
        scored(SignalSource::Reputation, 25, 80),
        missing(SignalSource::Whois, 10),
        missing(SignalSource::Tls, 10),
        missing(SignalSource::IpRisk, 5),
    ];
    let assessment = aggregate(&contributions);
    assert_eq!(assessment.overall_score, 80);
    assert_eq!(assessment.verdict, Verdict::LikelyPhishing);
}

#[test]
fn test_all_sources_missing_degrades_explicitly() {
    let contributions = vec![
        missing(SignalSource::Structural, 25),
        missing(SignalSource::Reputation, 25),
        missing(SignalSource::Whois, 10),
    ];
    let assessment = aggregate(&contributions);
    assert_eq!(assessment.overall_score, 0);
    assert_eq!(assessment.verdict, Verdict::NoStrongSignals);
    let note = assessment.breakdown["aggregate"].note.as_deref().unwrap();
    assert!(note.contains("insufficient data"));
    // Per-source entries are still present.
    assert!(assessment.breakdown.contains_key("structural_url_analysis"));
}

#[test]
fn test_red_flags_dedup_first_occurrence_wins() {
    let contributions = vec![
        Contribution {
            source: SignalSource::Structural,
            weight: 25,
            outcome: Outcome::Scored {
                sub_score: 40,
                flags: vec!["shared flag".to_string(), "structural only".to_string()],
            },
        },
        Contribution {
            source: SignalSource::Redirects,
            weight: 5,
            outcome: Outcome::Scored {
                sub_score: 0,
                flags: vec!["shared flag".to_string(), "redirect only".to_string()],
            },
        },
    ];
    let assessment = aggregate(&contributions);
    assert_eq!(
        assessment.red_flags,
        vec!["shared flag", "structural only", "redirect only"]
    );
}

#[test]
fn test_rounding_is_nearest() {
    // (25*50 + 25*51) / 50 = 50.5 -> 51
    let contributions = vec![
        scored(SignalSource::Structural, 25, 50),
        scored(SignalSource::Reputation, 25, 51),
    ];
    assert_eq!(aggregate(&contributions).overall_score, 51);
}

#[test]
fn test_weight_table_sums_to_normalization_constant() {
    use strum::IntoEnumIterator;
    let total: u32 = SignalSource::iter().map(weight_for).sum();
    assert_eq!(total, 100);
}

// Property-based tests using proptest
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_score_is_bounded(
        subs in prop::collection::vec((0u8..=100, 1u32..=50), 1..8)
    ) {
        let sources = [
            SignalSource::Structural,
            SignalSource::Redirects,
            SignalSource::PageContent,
            SignalSource::Tls,
            SignalSource::Reputation,
            SignalSource::Whois,
            SignalSource::IpRisk,
            SignalSource::Breach,
        ];
        let contributions: Vec<Contribution> = subs
            .iter()
            .zip(sources.iter())
            .map(|(&(sub, weight), &source)| scored(source, weight, sub))
            .collect();
        let assessment = aggregate(&contributions);
        prop_assert!(assessment.overall_score <= 100);
    }

    #[test]
    fn test_monotonicity_more_flags_never_lower_score(
        flag_count in 0usize..6,
        other_sub in 0u8..=100
    ) {
        // Adding one more structural red flag to an otherwise-fixed
        // signal set never decreases the overall score.
        let base = vec![
            scored(SignalSource::Structural, 25, structural_sub_score(flag_count)),
            scored(SignalSource::Reputation, 25, other_sub),
        ];
        let more = vec![
            scored(SignalSource::Structural, 25, structural_sub_score(flag_count + 1)),
            scored(SignalSource::Reputation, 25, other_sub),
        ];
        prop_assert!(aggregate(&more).overall_score >= aggregate(&base).overall_score);
    }

    #[test]
    fn test_renormalization_ignores_missing_weight(
        s1 in 0u8..=100,
        s3 in 0u8..=100,
        missing_weight in 1u32..=1000
    ) {
        // The configured weight of a missing source must not influence
        // the score.
        let with_small = vec![
            scored(SignalSource::Structural, 40, s1),
            missing(SignalSource::Reputation, 1),
            scored(SignalSource::Whois, 30, s3),
        ];
        let with_large = vec![
            scored(SignalSource::Structural, 40, s1),
            missing(SignalSource::Reputation, missing_weight),
            scored(SignalSource::Whois, 30, s3),
        ];
        prop_assert_eq!(
            aggregate(&with_small).overall_score,
            aggregate(&with_large).overall_score
        );
    }
}
