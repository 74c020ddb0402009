use super::*;

#[test]
fn test_extract_adds_https_scheme() {
    let features = extract("example.com").unwrap();
    assert_eq!(features.full_url, "https://example.com");
    assert_eq!(features.domain, "example.com");
    assert_eq!(features.tld, "com");
}

#[test]
fn test_extract_preserves_http_scheme() {
    let features = extract("http://example.com/path").unwrap();
    assert!(features.full_url.starts_with("http://"));
    assert_eq!(features.path, "/path");
}

#[test]
fn test_extract_rejects_garbage() {
    assert!(matches!(
        extract("not a url at all!!!"),
        Err(ScanError::InvalidUrl(_))
    ));
    assert!(matches!(extract(""), Err(ScanError::InvalidUrl(_))));
    assert!(matches!(extract("   "), Err(ScanError::InvalidUrl(_))));
}

#[test]
fn test_extract_rejects_oversized_url() {
    let long = format!("https://example.com/{}", "a".repeat(2100));
    assert!(matches!(extract(&long), Err(ScanError::InvalidUrl(_))));
}

#[test]
fn test_extract_is_deterministic() {
    let a = extract("https://Secure-Login.example.xyz/verify?acct=1").unwrap();
    let b = extract("https://Secure-Login.example.xyz/verify?acct=1").unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_ip_literal_host() {
    let features = extract("http://192.168.1.1/admin").unwrap();
    assert!(features.is_ip);
    assert_eq!(features.tld, "");
    assert!(!features.tld_suspicious);
    assert!(features.brand_impersonation.is_none());
}

#[test]
fn test_credential_stuffed_host_is_not_ip() {
    // The literal before the '@' is userinfo; the connection host is the
    // .tk domain. is_ip is judged on the parsed host.
    let features = extract("http://192.168.1.1@paypal-login.tk/verify").unwrap();
    assert!(!features.is_ip);
    assert!(features.has_at);
    assert_eq!(features.domain, "paypal-login.tk");
    assert!(features.tld_suspicious);
    assert_eq!(features.brand_impersonation.as_deref(), Some("paypal"));
    assert!(features.keyword_hits.iter().any(|k| k == "login"));
    assert!(features.keyword_hits.iter().any(|k| k == "verify"));
}

#[test]
fn test_clean_url_has_no_flags() {
    let features = extract("https://example.com").unwrap();
    assert!(structural_flags(&features).is_empty());
}

#[test]
fn test_phishy_url_has_at_least_three_flags() {
    let features = extract("http://192.168.1.1@paypal-login.tk/verify").unwrap();
    let flags = structural_flags(&features);
    assert!(
        flags.len() >= 3,
        "expected at least 3 flags, got {flags:?}"
    );
}

#[test]
fn test_keyword_hits_follow_dictionary_order() {
    // "verify" precedes "login" in the URL but not in the dictionary;
    // hits must come back in dictionary order.
    let features = extract("https://verify-login.example.com").unwrap();
    let login_pos = features.keyword_hits.iter().position(|k| k == "login");
    let verify_pos = features.keyword_hits.iter().position(|k| k == "verify");
    assert!(login_pos.is_some() && verify_pos.is_some());
    assert!(login_pos < verify_pos);
}

#[test]
fn test_brand_own_zone_is_not_impersonation() {
    let features = extract("https://www.paypal.com/signin").unwrap();
    assert!(features.brand_impersonation.is_none());

    let features = extract("https://checkout.paypal.com").unwrap();
    assert!(features.brand_impersonation.is_none());
}

#[test]
fn test_brand_foreign_zone_is_impersonation() {
    let features = extract("https://paypal.example.tk").unwrap();
    assert_eq!(features.brand_impersonation.as_deref(), Some("paypal"));
}

#[test]
fn test_subdomain_nesting_flag() {
    let features = extract("https://a.b.c.d.e.example.com").unwrap();
    assert!(features.num_dots > SUBDOMAIN_DOT_THRESHOLD);
    let flags = structural_flags(&features);
    assert!(flags.iter().any(|f| f.contains("subdomain nesting")));
}

#[test]
fn test_host_is_lowercased() {
    let features = extract("https://EXAMPLE.Com/Path").unwrap();
    assert_eq!(features.domain, "example.com");
    // Path case is preserved.
    assert_eq!(features.path, "/Path");
}

// Property-based tests using proptest
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_extract_idempotent_features(url in "[a-z]{3,20}\\.[a-z]{2,5}") {
        if let Ok(first) = extract(&url) {
            let second = extract(&url).unwrap();
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn test_extract_never_panics(input in "\\PC{0,200}") {
        let _ = extract(&input);
    }

    #[test]
    fn test_normalized_scheme_is_http_or_https(domain in "[a-z]{3,20}\\.[a-z]{2,5}") {
        let features = extract(&domain).unwrap();
        prop_assert!(features.full_url.starts_with("https://"));
    }

    #[test]
    fn test_flag_count_bounded_by_feature_count(
        domain in "[a-z]{3,15}\\.[a-z]{2,4}",
        path in "[a-z]{0,30}"
    ) {
        let url = format!("https://{domain}/{path}");
        if let Ok(features) = extract(&url) {
            let flags = structural_flags(&features);
            // Every flag maps to a concrete feature; dedup cannot grow it.
            prop_assert!(flags.len() <= 6 + features.keyword_hits.len());
        }
    }
}
