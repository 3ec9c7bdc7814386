//! Optional RON file overriding the transport and deadlines of a send.
//!
//! ```ron
//! (
//!     transport: (security: plaintext),
//!     timeouts: (data_secs: 60, transaction_secs: 90),
//! )
//! ```
//!
//! Omitted fields keep their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{ClientTimeouts, TransportConfig};
use crate::error::ConfigError;

/// Session settings read from a configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub transport: TransportConfig,

    #[serde(default)]
    pub timeouts: ClientTimeouts,
}

impl SessionConfig {
    /// Parses a session configuration from RON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfigFile`] if the text is not a valid
    /// session configuration. `origin` names the source in the error.
    pub fn from_ron(origin: &str, content: &str) -> Result<Self, ConfigError> {
        ron::from_str(content).map_err(|e| ConfigError::InvalidConfigFile {
            path: origin.to_string(),
            reason: e.to_string(),
        })
    }

    /// Reads and parses the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfigFile`] if the file cannot be read
    /// or does not parse.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let origin = path.display().to_string();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::InvalidConfigFile {
                path: origin.clone(),
                reason: e.to_string(),
            })?;

        Self::from_ron(&origin, &content)
    }
}
