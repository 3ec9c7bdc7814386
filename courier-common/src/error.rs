//! Error types for configuration handling.

use thiserror::Error;

/// Errors raised while interpreting the server address, credentials or
/// session configuration file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The port half of `host:port` is not an integer in range.
    #[error("Invalid port '{port}': {reason}")]
    InvalidPort { port: String, reason: String },

    /// The credential string is not of the form `address:secret`.
    #[error("Invalid credentials: expected 'address:secret'")]
    InvalidCredentials,

    /// No credential string was supplied at all.
    #[error("Missing credentials: set {0} or pass --credentials")]
    MissingCredentials(&'static str),

    /// The session configuration file could not be read or parsed.
    #[error("Invalid config file '{path}': {reason}")]
    InvalidConfigFile { path: String, reason: String },
}

impl ConfigError {
    /// Returns `true` if the error came from the server address.
    #[must_use]
    pub const fn is_port_error(&self) -> bool {
        matches!(self, Self::InvalidPort { .. })
    }
}
