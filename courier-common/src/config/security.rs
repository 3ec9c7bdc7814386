//! Transport protection for the SMTP connection.

use serde::{Deserialize, Serialize};

/// How the connection to the server is protected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransportSecurity {
    /// TLS from the first byte (SMTPS, usually port 465).
    #[default]
    Implicit,

    /// Unencrypted TCP.
    ///
    /// **WARNING**: Only use for loopback relays or tests. Credentials are
    /// refused over this transport unless the server is on a loopback host.
    Plaintext,
}

/// Transport settings for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TransportConfig {
    #[serde(default)]
    pub security: TransportSecurity,

    /// Whether to accept invalid TLS certificates (self-signed, expired, etc.).
    ///
    /// **SECURITY WARNING**: disables certificate validation. Only set to
    /// `true` for testing with self-signed certificates.
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl TransportConfig {
    /// Implicit TLS with certificate validation.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            security: TransportSecurity::Implicit,
            accept_invalid_certs: false,
        }
    }

    /// Unencrypted transport.
    #[must_use]
    pub const fn plaintext() -> Self {
        Self {
            security: TransportSecurity::Plaintext,
            accept_invalid_certs: false,
        }
    }

    /// Implicit TLS that accepts any certificate.
    ///
    /// **WARNING**: Only use in test environments.
    #[must_use]
    pub const fn insecure() -> Self {
        Self {
            security: TransportSecurity::Implicit,
            accept_invalid_certs: true,
        }
    }

    #[must_use]
    pub const fn is_encrypted(&self) -> bool {
        matches!(self.security, TransportSecurity::Implicit)
    }
}
