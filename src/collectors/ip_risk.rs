//! Resolved-IP risk profiling.
//!
//! Resolves the addresses behind the hostname and checks them against
//! the configured IP-reputation source. A public hostname that resolves
//! into private address space is flagged locally even with no provider
//! configured.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use crate::features::UrlFeatures;
use crate::pipeline::ScanContext;
use crate::signal::SignalResult;
use crate::utils::get_with_retry;

/// Findings about the addresses behind a hostname.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpRiskProfile {
    /// Resolved addresses (or the literal itself for IP URLs).
    pub addresses: Vec<IpAddr>,
    /// At least one address is private, loopback, or link-local.
    pub private_range: bool,
    /// Risk label from the configured provider, when one answered.
    pub provider_risk: Option<String>,
    /// Red flags emitted by this collector.
    pub flags: Vec<String>,
}

impl IpRiskProfile {
    /// Source-specific sub-score.
    pub fn sub_score(&self) -> u8 {
        let provider = self
            .provider_risk
            .as_deref()
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if provider.contains("high") || provider.contains("critical") {
            85
        } else if provider.contains("medium") {
            50
        } else if self.private_range {
            40
        } else {
            0
        }
    }
}

/// Resolves the scanned host and profiles its addresses.
pub async fn profile_ip_risk(
    ctx: &ScanContext,
    features: &UrlFeatures,
) -> SignalResult<IpRiskProfile> {
    let addresses: Vec<IpAddr> = if features.is_ip {
        // The URL host is already a literal; brackets around IPv6
        // literals are not part of the address.
        match features.domain.trim_matches(['[', ']']).parse::<IpAddr>() {
            Ok(addr) => vec![addr],
            Err(e) => {
                return SignalResult::unavailable(format!("unparsable ip literal: {e}"));
            }
        }
    } else {
        match ctx.resolver.lookup_ip(features.domain.clone()).await {
            Ok(lookup) => lookup.iter().collect(),
            Err(e) => {
                log::warn!("DNS resolution failed for {}: {e}", features.domain);
                return SignalResult::unavailable(format!("dns resolution failed: {e}"));
            }
        }
    };

    if addresses.is_empty() {
        return SignalResult::unavailable("dns resolution returned no addresses");
    }

    let private_range = addresses.iter().any(is_private_or_reserved);
    let provider_risk = query_provider(ctx, &addresses[0]).await;

    let mut flags = Vec::new();
    if private_range {
        flags.push("hostname resolves into a private address range".to_string());
    }
    if let Some(risk) = &provider_risk {
        let label = risk.to_ascii_lowercase();
        if label.contains("high") || label.contains("critical") {
            flags.push(format!("ip reputation reports {risk} risk"));
        }
    }

    let confidence = if provider_risk.is_some() { 0.85 } else { 0.5 };
    SignalResult::available(
        IpRiskProfile {
            addresses,
            private_range,
            provider_risk,
            flags,
        },
        confidence,
    )
}

/// Queries the configured IP-reputation endpoint, when there is one.
/// Provider failures are logged and treated as no answer; the local
/// resolution findings stand on their own.
async fn query_provider(ctx: &ScanContext, address: &IpAddr) -> Option<String> {
    let endpoint = ctx.config.ip_reputation_endpoint.as_ref()?;
    let endpoint = endpoint.replace("{ip}", &address.to_string());

    let response = match get_with_retry(|| ctx.client.get(&endpoint)).await {
        Ok(response) => response,
        Err(e) => {
            log::warn!("IP reputation lookup failed for {address}: {e}");
            return None;
        }
    };
    let body: serde_json::Value = response.json().await.ok()?;
    ["risk", "threat_level", "verdict"]
        .iter()
        .find_map(|key| body.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

fn is_private_or_reserved(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => v4.is_private() || v4.is_loopback() || v4.is_link_local(),
        IpAddr::V6(v6) => {
            // fc00::/7 unique-local plus loopback.
            v6.is_loopback() || (v6.segments()[0] & 0xfe00) == 0xfc00
        }
    }
}
