//! Configuration types.
//!
//! The `Config` struct is built once at process start (CLI flags plus
//! environment) and passed by reference into every collector. There are no
//! ambient configuration lookups anywhere else in the crate.

use std::path::PathBuf;

use clap::ValueEnum;

use crate::config::constants::{
    DEFAULT_COLLECTOR_BUDGET_MS, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_RDAP_ENDPOINT,
    DEFAULT_USER_AGENT, DEFAULT_YOUNG_DOMAIN_DAYS,
};

/// Logging level for the application.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// One configured reputation source.
///
/// The endpoint is a template; `{domain}` is replaced with the hostname
/// under analysis. The optional API key is sent as an `x-api-key` header.
#[derive(Debug, Clone)]
pub struct ReputationProvider {
    /// Provider name used in breakdown and red-flag strings.
    pub name: String,
    /// URL template containing a `{domain}` placeholder.
    pub endpoint: String,
    /// Optional API key.
    pub api_key: Option<String>,
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use url_sentry::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     db_path: PathBuf::from("./scans.db"),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Database path (SQLite file)
    pub db_path: PathBuf,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Per-request HTTP timeout in seconds
    pub timeout_seconds: u64,

    /// Per-collector settle budget in milliseconds
    pub collector_budget_ms: u64,

    /// WHOIS age threshold: domains younger than this are flagged
    pub young_domain_threshold_days: i64,

    /// RDAP base endpoint for registration lookups
    pub rdap_endpoint: String,

    /// Configured reputation sources; empty means the reputation signal
    /// degrades to unavailable
    pub reputation_providers: Vec<ReputationProvider>,

    /// IP reputation endpoint template with an `{ip}` placeholder
    pub ip_reputation_endpoint: Option<String>,

    /// Breach database endpoint template with an `{email}` placeholder
    pub breach_endpoint: Option<String>,

    /// API key for the breach endpoint
    pub breach_api_key: Option<String>,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./url_sentry.db"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECS,
            collector_budget_ms: DEFAULT_COLLECTOR_BUDGET_MS,
            young_domain_threshold_days: DEFAULT_YOUNG_DOMAIN_DAYS,
            rdap_endpoint: DEFAULT_RDAP_ENDPOINT.to_string(),
            reputation_providers: Vec::new(),
            ip_reputation_endpoint: None,
            breach_endpoint: None,
            breach_api_key: None,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

impl Config {
    /// Applies optional environment overrides for the external service
    /// endpoints. Keys are read once here; collectors never consult the
    /// environment themselves.
    ///
    /// Recognized variables:
    /// - `URL_SENTRY_REPUTATION_PROVIDERS`: `name=endpoint[=api_key]`
    ///   entries separated by `;`
    /// - `URL_SENTRY_IP_REPUTATION_ENDPOINT`
    /// - `URL_SENTRY_BREACH_ENDPOINT` / `URL_SENTRY_BREACH_API_KEY`
    /// - `URL_SENTRY_RDAP_ENDPOINT`
    pub fn apply_env_overrides(mut self) -> Self {
        if let Ok(raw) = std::env::var("URL_SENTRY_REPUTATION_PROVIDERS") {
            self.reputation_providers = parse_provider_list(&raw);
        }
        if let Ok(endpoint) = std::env::var("URL_SENTRY_IP_REPUTATION_ENDPOINT") {
            if !endpoint.is_empty() {
                self.ip_reputation_endpoint = Some(endpoint);
            }
        }
        if let Ok(endpoint) = std::env::var("URL_SENTRY_BREACH_ENDPOINT") {
            if !endpoint.is_empty() {
                self.breach_endpoint = Some(endpoint);
            }
        }
        if let Ok(key) = std::env::var("URL_SENTRY_BREACH_API_KEY") {
            if !key.is_empty() {
                self.breach_api_key = Some(key);
            }
        }
        if let Ok(endpoint) = std::env::var("URL_SENTRY_RDAP_ENDPOINT") {
            if !endpoint.is_empty() {
                self.rdap_endpoint = endpoint;
            }
        }
        self
    }
}

fn parse_provider_list(raw: &str) -> Vec<ReputationProvider> {
    raw.split(';')
        .filter_map(|entry| {
            let entry = entry.trim();
            if entry.is_empty() {
                return None;
            }
            let mut parts = entry.splitn(3, '=');
            let name = parts.next()?.trim();
            let endpoint = parts.next()?.trim();
            if name.is_empty() || endpoint.is_empty() {
                log::warn!("Skipping malformed reputation provider entry: {entry}");
                return None;
            }
            Some(ReputationProvider {
                name: name.to_string(),
                endpoint: endpoint.to_string(),
                api_key: parts.next().map(|k| k.trim().to_string()),
            })
        })
        .collect()
}
