//! Redirect chain analysis.
//!
//! Follows the redirect chain manually (the dedicated client has
//! redirects disabled) so every intermediate URL is captured, then flags
//! excessive hops and chains that land on an unrelated site.

use anyhow::Result;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::collectors::site_key;
use crate::config::MAX_REDIRECT_HOPS;
use crate::features::UrlFeatures;
use crate::pipeline::ScanContext;
use crate::signal::SignalResult;

/// Outcome of walking one redirect chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectAnalysis {
    /// Every URL visited, starting with the scanned URL.
    pub chain: Vec<String>,
    /// Where the chain ended.
    pub final_url: String,
    /// Number of redirect hops taken.
    pub hop_count: usize,
    /// The chain was still redirecting when the hop bound was reached.
    pub truncated: bool,
    /// The final URL is on a different registrable domain than the start.
    pub cross_domain: bool,
    /// Red flags emitted by this collector.
    pub flags: Vec<String>,
}

impl RedirectAnalysis {
    /// Source-specific sub-score.
    pub fn sub_score(&self) -> u8 {
        match (self.cross_domain, self.truncated) {
            (true, true) => 85,
            (true, false) => 60,
            (false, true) => 45,
            (false, false) => 0,
        }
    }
}

/// Follows the redirect chain for the scanned URL, up to the hop bound.
/// Network failures and timeouts degrade to `Unavailable`.
pub async fn analyze_redirects(
    ctx: &ScanContext,
    features: &UrlFeatures,
) -> SignalResult<RedirectAnalysis> {
    match resolve_chain(&ctx.redirect_client, &features.full_url, MAX_REDIRECT_HOPS).await {
        Ok((final_url, chain, truncated)) => {
            SignalResult::available(build_analysis(features, final_url, chain, truncated), 0.9)
        }
        Err(e) => {
            log::warn!("Redirect resolution failed for {}: {e}", features.full_url);
            SignalResult::unavailable(format!("redirect resolution failed: {e}"))
        }
    }
}

fn build_analysis(
    features: &UrlFeatures,
    final_url: String,
    chain: Vec<String>,
    truncated: bool,
) -> RedirectAnalysis {
    let hop_count = chain.len().saturating_sub(1);
    let final_host = Url::parse(&final_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default();
    let cross_domain = !final_host.is_empty() && site_key(&final_host) != site_key(&features.domain);

    let mut flags = Vec::new();
    if truncated {
        flags.push(format!(
            "redirect chain still active after {MAX_REDIRECT_HOPS} hops"
        ));
    }
    if cross_domain {
        flags.push(format!(
            "redirect chain lands on an unrelated domain: {final_host}"
        ));
        if features.brand_impersonation.is_some() {
            flags.push("redirect leaves a brand-impersonating url".to_string());
        }
    }

    RedirectAnalysis {
        chain,
        final_url,
        hop_count,
        truncated,
        cross_domain,
        flags,
    }
}

/// Resolves the redirect chain for a URL, following redirects up to a
/// maximum number of hops.
///
/// Returns `(final_url, chain, truncated)` where `chain` contains every
/// visited URL and `truncated` is true when the hop bound was hit while
/// the server was still redirecting.
async fn resolve_chain(
    client: &reqwest::Client,
    start_url: &str,
    max_hops: usize,
) -> Result<(String, Vec<String>, bool)> {
    let mut chain: Vec<String> = Vec::new();
    let mut current = start_url.to_string();

    for _ in 0..max_hops {
        chain.push(current.clone());
        let resp = client.get(&current).send().await?;

        let status = resp.status();
        if !status.is_redirection() {
            return Ok((current, chain, false));
        }
        match resp.headers().get(reqwest::header::LOCATION) {
            Some(loc) => {
                let loc = loc.to_str().unwrap_or("").to_string();
                let next = Url::parse(&loc)
                    .or_else(|_| Url::parse(&current).and_then(|base| base.join(&loc)))?;
                current = next.to_string();
            }
            None => {
                // Redirect status with no Location header; nowhere to go.
                log::warn!("Redirect status {status} for {current} but no Location header");
                return Ok((current, chain, false));
            }
        }
    }
    Ok((current, chain, true))
}
