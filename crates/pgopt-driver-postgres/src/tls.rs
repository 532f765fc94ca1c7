//! PostgreSQL TLS Support
//!
//! Maps the configured `sslmode` onto a native-tls connector. Like libpq,
//! `allow`, `prefer` and `require` encrypt without verifying the server,
//! `verify-ca` checks the chain only and `verify-full` also checks the hostname.

use native_tls::{TlsConnector as NativeTlsConnector, TlsConnectorBuilder};
use pgopt_core::SslMode;
use postgres_native_tls::MakeTlsConnector;
use tokio_postgres::config::SslMode as PgSslMode;
use tracing::debug;

/// Error types for TLS setup
#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    /// No connector exists for a disabled mode
    #[error("TLS mode {mode} does not use a TLS connector")]
    UnsupportedMode { mode: SslMode },

    /// native-tls refused the configuration
    #[error("TLS configuration error: {0}")]
    ConfigurationError(String),
}

/// Build a TLS connector for the given mode
pub fn build_tls_connector(mode: SslMode) -> Result<MakeTlsConnector, TlsError> {
    if mode == SslMode::Disable {
        return Err(TlsError::UnsupportedMode { mode });
    }

    let mut builder = NativeTlsConnector::builder();
    configure_verification(&mut builder, mode);

    let connector = builder
        .build()
        .map_err(|e| TlsError::ConfigurationError(e.to_string()))?;

    debug!(mode = %mode, "TLS connector built");

    Ok(MakeTlsConnector::new(connector))
}

/// tokio-postgres only distinguishes disable, prefer and require
pub fn pg_ssl_mode(mode: SslMode) -> PgSslMode {
    match mode {
        SslMode::Disable => PgSslMode::Disable,
        SslMode::Allow | SslMode::Prefer => PgSslMode::Prefer,
        SslMode::Require | SslMode::VerifyCa | SslMode::VerifyFull => PgSslMode::Require,
    }
}

/// Which certificate checks native-tls should skip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Verification {
    accept_invalid_certs: bool,
    accept_invalid_hostnames: bool,
}

fn verification(mode: SslMode) -> Verification {
    Verification {
        accept_invalid_certs: !mode.requires_ca_verification(),
        accept_invalid_hostnames: !mode.requires_hostname_verification(),
    }
}

fn configure_verification(builder: &mut TlsConnectorBuilder, mode: SslMode) {
    let checks = verification(mode);
    builder.danger_accept_invalid_certs(checks.accept_invalid_certs);
    builder.danger_accept_invalid_hostnames(checks.accept_invalid_hostnames);
}
