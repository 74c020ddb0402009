//! Versioned heuristic dictionaries.
//!
//! These tables drive the structural URL checks. They are data, not logic:
//! scoring behavior must be reproducible for a given dictionary version, so
//! changes here bump `DICTIONARY_VERSION` and never happen inline at call
//! sites.

/// Version tag recorded in incident metadata so results can be tied back
/// to the exact dictionaries that produced them.
pub const DICTIONARY_VERSION: &str = "2026-07-01";

/// Sensitive terms scanned for in the full URL (lowercased). Match order
/// is table order; `keyword_hits` preserves it.
pub const SENSITIVE_KEYWORDS: &[&str] = &[
    "login",
    "signin",
    "verify",
    "secure",
    "account",
    "update",
    "confirm",
    "password",
    "banking",
    "wallet",
    "invoice",
    "payment",
];

/// Top-level domains with a disproportionate share of abuse in phishing
/// feeds. Stored without the leading dot.
pub const SUSPICIOUS_TLDS: &[&str] = &[
    "tk", "ml", "ga", "cf", "gq", "xyz", "top", "click", "link", "rest", "zip",
];

/// Frequently impersonated brands. A hostname containing one of these that
/// is not the brand's own `.com` zone is treated as impersonation.
pub const MAJOR_BRANDS: &[&str] = &[
    "paypal",
    "apple",
    "amazon",
    "microsoft",
    "google",
    "netflix",
    "facebook",
    "instagram",
    "chase",
    "wellsfargo",
    "coinbase",
    "dhl",
];
