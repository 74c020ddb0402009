//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, limits, scoring thresholds)
//! - Versioned heuristic dictionaries (keywords, TLDs, brands)
//! - The `Config` struct constructed once at process start

mod constants;
mod dictionaries;
mod types;

pub use constants::*;
pub use dictionaries::*;
pub use types::{Config, LogFormat, LogLevel, ReputationProvider};
