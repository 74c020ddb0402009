//! URL feature extraction.
//!
//! Derives the structural indicators every other layer keys off. This
//! stage is pure: same input URL, same features, no network access. The
//! keyword/TLD/brand tables come from `config::dictionaries` so behavior
//! is reproducible for a given dictionary version.

use serde::{Deserialize, Serialize};
use url::Host;

use crate::config::{
    LONG_URL_THRESHOLD, MAJOR_BRANDS, MAX_URL_LENGTH, SENSITIVE_KEYWORDS, SUBDOMAIN_DOT_THRESHOLD,
    SUSPICIOUS_TLDS,
};
use crate::error_handling::ScanError;

/// Structural indicators derived once per scan. Immutable after
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlFeatures {
    /// Normalized URL (scheme defaulted to https when absent).
    pub full_url: String,
    /// Lowercased connection host.
    pub domain: String,
    /// URL path component.
    pub path: String,
    /// The connection host is an IPv4 or IPv6 literal. This is the parsed
    /// host, after any userinfo split, never the raw authority string.
    pub is_ip: bool,
    /// The URL carries userinfo (`user@host`), a classic obfuscation.
    pub has_at: bool,
    /// Dots in the host.
    pub num_dots: u32,
    /// Length of the normalized URL.
    pub url_length: usize,
    /// Sensitive terms found anywhere in the URL, in dictionary order.
    pub keyword_hits: Vec<String>,
    /// Last dot-segment of the host (empty for IP literals).
    pub tld: String,
    /// The TLD is in the suspicious-TLD table.
    pub tld_suspicious: bool,
    /// At most one impersonated brand: the host contains the brand name
    /// but is not under the brand's own `.com` zone.
    pub brand_impersonation: Option<String>,
}

/// Parses and normalizes a raw URL into its structural features.
///
/// A missing scheme defaults to `https`. Anything that still fails to
/// parse as an http/https URL with a host is rejected with
/// `ScanError::InvalidUrl` before any collector runs.
pub fn extract(raw_url: &str) -> Result<UrlFeatures, ScanError> {
    let trimmed = raw_url.trim();
    if trimmed.is_empty() {
        return Err(ScanError::InvalidUrl("empty input".to_string()));
    }
    if trimmed.len() > MAX_URL_LENGTH {
        return Err(ScanError::InvalidUrl(format!(
            "url exceeds maximum length of {MAX_URL_LENGTH}"
        )));
    }

    let normalized = if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        format!("https://{trimmed}")
    } else {
        trimmed.to_string()
    };
    if normalized.len() > MAX_URL_LENGTH {
        return Err(ScanError::InvalidUrl(format!(
            "url exceeds maximum length of {MAX_URL_LENGTH} after normalization"
        )));
    }

    let parsed = url::Url::parse(&normalized)
        .map_err(|e| ScanError::InvalidUrl(format!("{trimmed}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ScanError::InvalidUrl(format!(
                "unsupported scheme: {other}"
            )))
        }
    }
    let host = parsed
        .host()
        .ok_or_else(|| ScanError::InvalidUrl(format!("{trimmed}: no host component")))?;

    // IP-literal-ness is judged on the host actually used for the
    // connection, not on whatever precedes an '@' in the authority.
    let is_ip = matches!(host, Host::Ipv4(_) | Host::Ipv6(_));
    let domain = parsed
        .host_str()
        .unwrap_or_default()
        .to_ascii_lowercase();
    let has_at = !parsed.username().is_empty() || parsed.password().is_some();

    let haystack = normalized.to_ascii_lowercase();
    let keyword_hits: Vec<String> = SENSITIVE_KEYWORDS
        .iter()
        .filter(|k| haystack.contains(*k))
        .map(|k| k.to_string())
        .collect();

    let tld = if is_ip {
        String::new()
    } else {
        domain.rsplit('.').next().unwrap_or_default().to_string()
    };
    let tld_suspicious = !tld.is_empty() && SUSPICIOUS_TLDS.contains(&tld.as_str());

    let brand_impersonation = if is_ip {
        None
    } else {
        MAJOR_BRANDS
            .iter()
            .find(|brand| {
                domain.contains(*brand) && !domain.ends_with(&format!("{brand}.com"))
            })
            .map(|brand| brand.to_string())
    };

    Ok(UrlFeatures {
        num_dots: domain.matches('.').count() as u32,
        url_length: normalized.len(),
        path: parsed.path().to_string(),
        full_url: normalized,
        domain,
        is_ip,
        has_at,
        keyword_hits,
        tld,
        tld_suspicious,
        brand_impersonation,
    })
}

/// Derives the structural red flags for a feature set, in detection
/// order. This list feeds both the structural contribution of the
/// comprehensive scan and the URL-only scoring path.
pub fn structural_flags(features: &UrlFeatures) -> Vec<String> {
    let mut flags = Vec::new();
    if features.is_ip {
        flags.push("hosted on a raw IP address".to_string());
    }
    if features.has_at {
        flags.push("credentials embedded in the URL authority".to_string());
    }
    if features.num_dots > SUBDOMAIN_DOT_THRESHOLD {
        flags.push(format!(
            "excessive subdomain nesting ({} dots)",
            features.num_dots
        ));
    }
    if features.url_length > LONG_URL_THRESHOLD {
        flags.push(format!("unusually long url ({} chars)", features.url_length));
    }
    for keyword in &features.keyword_hits {
        flags.push(format!("sensitive keyword '{keyword}' in url"));
    }
    if features.tld_suspicious {
        flags.push(format!("suspicious top-level domain '.{}'", features.tld));
    }
    if let Some(brand) = &features.brand_impersonation {
        flags.push(format!("possible impersonation of brand '{brand}'"));
    }
    flags
}
