//! TLS posture audit.
//!
//! Connects to the target with a verifying TLS client and inspects the
//! presented certificate. Absence of HTTPS is a red flag, not a failure;
//! only a network-level inability to reach the host degrades to
//! `Unavailable`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use rustls::pki_types::ServerName;
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;

use crate::config::{CERT_EXPIRY_WARNING_DAYS, TCP_CONNECT_TIMEOUT_SECS, TLS_HANDSHAKE_TIMEOUT_SECS};
use crate::features::UrlFeatures;
use crate::pipeline::ScanContext;
use crate::signal::SignalResult;

/// Findings from one TLS handshake with the target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsAudit {
    /// The scanned URL uses HTTPS at all.
    pub https: bool,
    /// The handshake completed against the standard root store.
    pub handshake_ok: bool,
    /// Negotiated TLS protocol version.
    pub protocol: Option<String>,
    /// Certificate subject DN.
    pub subject: Option<String>,
    /// Certificate issuer DN.
    pub issuer: Option<String>,
    /// Certificate notAfter.
    pub valid_to: Option<NaiveDateTime>,
    /// Subject equals issuer.
    pub self_signed: bool,
    /// Certificate is past notAfter.
    pub expired: bool,
    /// Days until expiry (negative when already expired).
    pub days_until_expiry: Option<i64>,
    /// Red flags emitted by this collector.
    pub flags: Vec<String>,
}

impl TlsAudit {
    /// Source-specific sub-score.
    pub fn sub_score(&self) -> u8 {
        if !self.https {
            70
        } else if !self.handshake_ok {
            80
        } else if self.expired || self.self_signed {
            75
        } else if matches!(self.days_until_expiry, Some(d) if d <= CERT_EXPIRY_WARNING_DAYS) {
            25
        } else {
            0
        }
    }
}

/// Audits the TLS posture of the scanned URL.
///
/// HTTP URLs are answered immediately (the missing HTTPS is itself the
/// finding). For HTTPS, a failed handshake is also an answer; only
/// failing to reach the host at the TCP level is `Unavailable`.
pub async fn audit_tls(ctx: &ScanContext, features: &UrlFeatures) -> SignalResult<TlsAudit> {
    let _ = ctx; // connections here are raw sockets, not reqwest
    if !features.full_url.starts_with("https://") {
        return SignalResult::available(
            TlsAudit {
                https: false,
                handshake_ok: false,
                protocol: None,
                subject: None,
                issuer: None,
                valid_to: None,
                self_signed: false,
                expired: false,
                days_until_expiry: None,
                flags: vec!["connection is not protected by https".to_string()],
            },
            1.0,
        );
    }

    let port = url::Url::parse(&features.full_url)
        .ok()
        .and_then(|u| u.port())
        .unwrap_or(443);

    let sock = match tokio::time::timeout(
        Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS),
        TcpStream::connect((features.domain.clone(), port)),
    )
    .await
    {
        Ok(Ok(sock)) => sock,
        Ok(Err(e)) => {
            log::warn!("TCP connect failed for {}:{port}: {e}", features.domain);
            return SignalResult::unavailable(format!("tcp connect failed: {e}"));
        }
        Err(_) => {
            return SignalResult::unavailable(format!(
                "tcp connect timeout after {TCP_CONNECT_TIMEOUT_SECS}s"
            ));
        }
    };

    match handshake_and_inspect(sock, &features.domain).await {
        Ok(audit) => SignalResult::available(audit, 0.95),
        Err(e) => {
            // A completed TCP connect with a failed handshake is a
            // finding about the certificate, not an outage.
            log::debug!("TLS handshake failed for {}: {e}", features.domain);
            SignalResult::available(
                TlsAudit {
                    https: true,
                    handshake_ok: false,
                    protocol: None,
                    subject: None,
                    issuer: None,
                    valid_to: None,
                    self_signed: false,
                    expired: false,
                    days_until_expiry: None,
                    flags: vec![format!("certificate could not be validated: {e}")],
                },
                0.8,
            )
        }
    }
}

async fn handshake_and_inspect(sock: TcpStream, domain: &str) -> Result<TlsAudit> {
    let mut root_store = RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let config = ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    let server_name = ServerName::try_from(domain.to_string())
        .map_err(|e| anyhow::anyhow!("invalid server name: {e}"))?;

    let connector = TlsConnector::from(Arc::new(config));
    let tls_stream = tokio::time::timeout(
        Duration::from_secs(TLS_HANDSHAKE_TIMEOUT_SECS),
        connector.connect(server_name, sock),
    )
    .await
    .map_err(|_| anyhow::anyhow!("handshake timeout after {TLS_HANDSHAKE_TIMEOUT_SECS}s"))??;

    let (_, session) = tls_stream.get_ref();
    let protocol = session.protocol_version().map(|v| format!("{v:?}"));

    let mut audit = TlsAudit {
        https: true,
        handshake_ok: true,
        protocol,
        subject: None,
        issuer: None,
        valid_to: None,
        self_signed: false,
        expired: false,
        days_until_expiry: None,
        flags: Vec::new(),
    };

    if let Some(certs) = session.peer_certificates() {
        if let Some(cert) = certs.first() {
            let (_, cert) = x509_parser::parse_x509_certificate(cert.as_ref())?;
            let tbs = &cert.tbs_certificate;

            let subject = tbs.subject.to_string();
            let issuer = tbs.issuer.to_string();
            audit.self_signed = subject.trim().eq_ignore_ascii_case(issuer.trim());

            let valid_to_str = tbs
                .validity
                .not_after
                .to_rfc2822()
                .map_err(|e| anyhow::anyhow!("RFC2822 conversion error for not_after: {e}"))?;
            let valid_to = NaiveDateTime::parse_from_str(&valid_to_str, "%a, %d %b %Y %H:%M:%S %z")
                .map_err(|_| anyhow::anyhow!("failed to parse not_after"))?;

            let now = Utc::now().naive_utc();
            audit.expired = valid_to < now;
            audit.days_until_expiry = Some((valid_to - now).num_days());
            audit.subject = Some(subject);
            audit.issuer = Some(issuer);
            audit.valid_to = Some(valid_to);
        }
    }

    if audit.self_signed {
        audit.flags.push("certificate is self-signed".to_string());
    }
    if audit.expired {
        if let Some(valid_to) = audit.valid_to {
            audit.flags.push(format!(
                "certificate expired on {}",
                DateTime::<Utc>::from_naive_utc_and_offset(valid_to, Utc).format("%Y-%m-%d")
            ));
        }
    } else if let Some(days) = audit.days_until_expiry {
        if days <= CERT_EXPIRY_WARNING_DAYS {
            audit
                .flags
                .push(format!("certificate expires in {days} day(s)"));
        }
    }

    Ok(audit)
}
