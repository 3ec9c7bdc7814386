//! Configuration types for the courier mail sender.
//!
//! ## Modules
//!
//! - [`endpoint`]: server address and credential strings
//! - [`timeouts`]: per-step and whole-transaction deadlines
//! - [`security`]: how the transport is protected
//! - [`session`]: optional RON file overriding transport and timeouts

pub mod endpoint;
pub mod security;
pub mod session;
pub mod timeouts;

pub use crate::error::ConfigError;
pub use endpoint::{Credentials, DEFAULT_SERVER, ServerAddress};
pub use security::{TransportConfig, TransportSecurity};
pub use session::SessionConfig;
pub use timeouts::ClientTimeouts;
