//! Process-level initialization: logger, HTTP clients, DNS resolver,
//! crypto provider.

mod client;
mod logger;
mod resolver;

pub use client::{init_client, init_redirect_client};
pub use logger::init_logger_with;
pub use resolver::init_resolver;

/// Installs the default rustls crypto provider for TLS operations.
///
/// Idempotent; a second call is a no-op.
pub fn init_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}
