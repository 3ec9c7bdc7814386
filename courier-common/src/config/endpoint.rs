//! Parsing of the `host:port` and `address:secret` strings supplied by the
//! caller's environment.

use core::fmt::{self, Display};
use std::str::FromStr;

use crate::error::ConfigError;

/// Server used when no address, or a half-empty one, is supplied.
pub const DEFAULT_SERVER: &str = "smtp.163.com:465";

/// A mail server endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress {
    pub host: String,
    pub port: u16,
}

impl ServerAddress {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parses `host:port`.
    ///
    /// An empty host or an empty port selects [`DEFAULT_SERVER`]. A port that
    /// is not an integer in `0..=65535` is an error.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let (host, port) = match value.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() && !port.is_empty() => (host, port),
            _ => DEFAULT_SERVER
                .rsplit_once(':')
                .unwrap_or((DEFAULT_SERVER, "465")),
        };

        let port = port.parse::<u16>().map_err(|e| ConfigError::InvalidPort {
            port: port.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self::new(host, port))
    }
}

impl Default for ServerAddress {
    fn default() -> Self {
        Self::new("smtp.163.com", 465)
    }
}

impl FromStr for ServerAddress {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for ServerAddress {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{}:{}", self.host, self.port)
    }
}

/// The sender's mailbox and its secret.
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub address: String,
    secret: String,
}

impl Credentials {
    #[must_use]
    pub fn new(address: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            secret: secret.into(),
        }
    }

    /// Parses `address:secret`, splitting at the first colon so the secret
    /// may itself contain colons.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.split_once(':') {
            Some((address, secret)) if !address.is_empty() && !secret.is_empty() => {
                Ok(Self::new(address, secret))
            }
            _ => Err(ConfigError::InvalidCredentials),
        }
    }

    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl FromStr for Credentials {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("Credentials")
            .field("address", &self.address)
            .field("secret", &"<redacted>")
            .finish()
    }
}
