//! Page content scanning and form inspection.
//!
//! Fetches the page once (bounded by size and the client timeout) and
//! looks for credential-harvesting patterns: password fields in forms
//! that post to a foreign origin, and password fields served over plain
//! HTTP.

use std::sync::LazyLock;

use reqwest::Url;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use crate::collectors::site_key;
use crate::config::MAX_PAGE_BYTES;
use crate::features::UrlFeatures;
use crate::pipeline::ScanContext;
use crate::signal::SignalResult;
use crate::utils::get_with_retry;

static FORM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("form").expect("static selector"));
static PASSWORD_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("input[type='password']").expect("static selector"));
static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("static selector"));

/// Findings from one bounded page fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageInspection {
    /// URL the content was actually served from (after redirects).
    pub final_url: String,
    /// Page title, if present.
    pub title: Option<String>,
    /// Total forms on the page.
    pub form_count: usize,
    /// Forms containing a password field.
    pub password_form_count: usize,
    /// Foreign origins that password forms post to.
    pub foreign_form_targets: Vec<String>,
    /// A password form is served or submitted over plain HTTP.
    pub insecure_password_form: bool,
    /// Red flags emitted by this collector.
    pub flags: Vec<String>,
}

impl PageInspection {
    /// Source-specific sub-score.
    pub fn sub_score(&self) -> u8 {
        if !self.foreign_form_targets.is_empty() {
            90
        } else if self.insecure_password_form {
            70
        } else if self.password_form_count > 0 {
            10
        } else {
            0
        }
    }
}

/// Fetches and inspects the page behind the scanned URL. Any fetch
/// failure degrades to `Unavailable`; oversized bodies are truncated,
/// never rejected.
pub async fn inspect_page(
    ctx: &ScanContext,
    features: &UrlFeatures,
) -> SignalResult<PageInspection> {
    let url = features.full_url.clone();
    let response = match get_with_retry(|| ctx.client.get(&url)).await {
        Ok(response) => response,
        Err(e) => {
            log::warn!("Page fetch failed for {url}: {e}");
            return SignalResult::unavailable(format!("page fetch failed: {e}"));
        }
    };

    let final_url = response.url().clone();
    let body = match response.bytes().await {
        Ok(bytes) => {
            let capped = &bytes[..bytes.len().min(MAX_PAGE_BYTES)];
            String::from_utf8_lossy(capped).into_owned()
        }
        Err(e) => {
            log::warn!("Page body read failed for {url}: {e}");
            return SignalResult::unavailable(format!("page body read failed: {e}"));
        }
    };

    SignalResult::available(inspect_html(&body, &final_url), 0.85)
}

/// Parses the fetched document and derives form findings. Pure; split
/// out so the detection rules are testable without a network.
pub fn inspect_html(body: &str, final_url: &Url) -> PageInspection {
    let document = Html::parse_document(body);

    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty());

    let page_host = final_url.host_str().unwrap_or_default();
    let page_is_http = final_url.scheme() == "http";

    let mut form_count = 0;
    let mut password_form_count = 0;
    let mut foreign_form_targets: Vec<String> = Vec::new();
    let mut insecure_password_form = false;

    for form in document.select(&FORM_SELECTOR) {
        form_count += 1;
        let has_password = form.select(&PASSWORD_SELECTOR).next().is_some();
        if !has_password {
            continue;
        }
        password_form_count += 1;

        let action = form.value().attr("action").unwrap_or("");
        let target = if action.is_empty() {
            Some(final_url.clone())
        } else {
            final_url.join(action).ok()
        };

        match target {
            Some(target) => {
                if target.scheme() == "http" || page_is_http {
                    insecure_password_form = true;
                }
                if let Some(target_host) = target.host_str() {
                    if site_key(target_host) != site_key(page_host) {
                        let origin = target_host.to_string();
                        if !foreign_form_targets.contains(&origin) {
                            foreign_form_targets.push(origin);
                        }
                    }
                }
            }
            None => {
                if page_is_http {
                    insecure_password_form = true;
                }
            }
        }
    }

    let mut flags = Vec::new();
    for origin in &foreign_form_targets {
        flags.push(format!("password form posts to a foreign origin: {origin}"));
    }
    if insecure_password_form {
        flags.push("password form submitted over plain http".to_string());
    }

    PageInspection {
        final_url: final_url.to_string(),
        title,
        form_count,
        password_form_count,
        foreign_form_targets,
        insecure_password_form,
        flags,
    }
}
