//! DNS resolver initialization.

use std::sync::Arc;

use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;

/// Initializes the shared DNS resolver.
///
/// Tries the system configuration first and falls back to public
/// defaults when `/etc/resolv.conf` is unusable.
pub fn init_resolver() -> Arc<TokioAsyncResolver> {
    let resolver = match TokioAsyncResolver::tokio_from_system_conf() {
        Ok(resolver) => resolver,
        Err(e) => {
            log::warn!("Failed to read system DNS config ({e}); using defaults");
            TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
        }
    };
    Arc::new(resolver)
}
