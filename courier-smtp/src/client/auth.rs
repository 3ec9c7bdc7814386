//! SASL PLAIN authentication (RFC 4616).

use base64::{Engine, engine::general_purpose::STANDARD};
use courier_common::config::Credentials;

use super::error::{ClientError, Result};

/// Hosts on which credentials may travel without TLS.
const LOOPBACK_HOSTS: [&str; 3] = ["localhost", "127.0.0.1", "::1"];

/// What the client knows about the server when it is about to authenticate.
#[derive(Debug, Clone, Copy)]
pub struct ServerInfo<'a> {
    /// The host name the connection was made to.
    pub name: &'a str,
    /// Whether the connection is TLS protected.
    pub tls: bool,
}

/// PLAIN credentials bound to the host they are meant for.
#[derive(Debug, Clone)]
pub struct PlainAuth {
    identity: String,
    credentials: Credentials,
    host: String,
}

impl PlainAuth {
    /// Binds `credentials` to `host`. They are only ever sent to a server
    /// reached under that exact name.
    #[must_use]
    pub fn new(credentials: Credentials, host: impl Into<String>) -> Self {
        Self {
            identity: String::new(),
            credentials,
            host: host.into(),
        }
    }

    /// Authorization identity to act as; empty means the credential owner.
    #[must_use]
    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = identity.into();
        self
    }

    /// The base64 initial response for `AUTH PLAIN`.
    ///
    /// Fails without revealing anything if the connection is unencrypted to a
    /// non-loopback host, or if the server is not the bound host.
    pub fn initial_response(&self, server: ServerInfo<'_>) -> Result<String> {
        if !server.tls && !LOOPBACK_HOSTS.contains(&server.name) {
            return Err(ClientError::AuthRefused("unencrypted connection".to_string()));
        }
        if server.name != self.host {
            return Err(ClientError::AuthRefused(format!(
                "wrong host name: credentials are bound to {}, connected to {}",
                self.host, server.name
            )));
        }

        let message = format!(
            "{}\0{}\0{}",
            self.identity,
            self.credentials.address,
            self.credentials.secret()
        );
        Ok(STANDARD.encode(message))
    }
}
