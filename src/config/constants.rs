//! Configuration constants.
//!
//! All timeouts, bounds, and scoring thresholds live here so behavior is
//! reproducible across runs and adjustable without touching logic.

/// Default HTTP User-Agent header value.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; url_sentry/0.1; +https://github.com/url_sentry)";

/// Maximum URL length accepted for analysis. Matches common browser and
/// server limits (IE, Apache, Nginx defaults).
pub const MAX_URL_LENGTH: usize = 2048;

/// Maximum number of redirect hops followed before the chain is flagged
/// as excessive.
pub const MAX_REDIRECT_HOPS: usize = 10;

/// Maximum page body size fetched for content inspection (bytes).
pub const MAX_PAGE_BYTES: usize = 512 * 1024;

/// TCP connect timeout for the TLS auditor (seconds).
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 5;

/// TLS handshake timeout for the TLS auditor (seconds).
pub const TLS_HANDSHAKE_TIMEOUT_SECS: u64 = 5;

/// Per-request HTTP timeout default (seconds).
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Per-collector settle budget: every collector either completes or is
/// treated as unavailable once this many milliseconds have elapsed.
pub const DEFAULT_COLLECTOR_BUDGET_MS: u64 = 8_000;

/// Domains younger than this many days are flagged by the WHOIS check.
pub const DEFAULT_YOUNG_DOMAIN_DAYS: i64 = 30;

/// Default RDAP endpoint used for WHOIS-equivalent registration lookups.
/// The queried domain is appended to this base.
pub const DEFAULT_RDAP_ENDPOINT: &str = "https://rdap.org/domain/";

/// Number of dots in a hostname above which subdomain nesting is flagged.
pub const SUBDOMAIN_DOT_THRESHOLD: u32 = 4;

/// URL length above which the URL is flagged as unusually long.
pub const LONG_URL_THRESHOLD: usize = 100;

/// Certificates expiring within this many days are flagged.
pub const CERT_EXPIRY_WARNING_DAYS: i64 = 14;

/// Comprehensive-scan verdict bands. A score at an exact boundary takes
/// the more severe label.
pub const VERDICT_SUSPICIOUS_FLOOR: u8 = 30;
/// Score at or above this is `likely_phishing`.
pub const VERDICT_PHISHING_FLOOR: u8 = 60;

/// Simple URL-only scoring policy (structural flags, no network). Kept
/// separate from the comprehensive-scan bands; the two paths are tuned
/// independently.
pub const SIMPLE_SUSPICIOUS_FLAGS: usize = 1;
/// Structural flag count at or above this is `likely_phishing` on the
/// URL-only path.
pub const SIMPLE_PHISHING_FLAGS: usize = 2;
