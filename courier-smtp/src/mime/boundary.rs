//! Random multipart delimiters.

use core::fmt::{self, Display};
use std::sync::OnceLock;

use rand::RngCore;

/// Number of random bytes behind a generated boundary.
pub const BOUNDARY_BYTES: usize = 16;

/// Longest boundary permitted by RFC 2046.
const MAX_BOUNDARY_LEN: usize = 70;

/// The delimiter token separating the parts of a multipart message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Boundary(String);

impl Boundary {
    /// Generates a fresh token: [`BOUNDARY_BYTES`] bytes from the thread-local
    /// CSPRNG, hex encoded (32 characters).
    #[must_use]
    pub fn generate() -> Self {
        let mut buf = [0u8; BOUNDARY_BYTES];
        rand::rng().fill_bytes(&mut buf);
        Self(hex::encode(buf))
    }

    /// The token shared by every letter built in this process.
    ///
    /// Generated on first use and fixed afterwards.
    pub fn process() -> &'static Self {
        static PROCESS_BOUNDARY: OnceLock<Boundary> = OnceLock::new();
        PROCESS_BOUNDARY.get_or_init(Self::generate)
    }

    /// Uses a caller-chosen token, e.g. for reproducible output.
    ///
    /// Returns `None` unless the token is 1 to 70 characters that are valid
    /// both as RFC 2046 boundary characters and in an unquoted `boundary=`
    /// parameter: ASCII letters, digits and `'+_-.`.
    #[must_use]
    pub fn from_token(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        let valid = !token.is_empty()
            && token.len() <= MAX_BOUNDARY_LEN
            && token.chars().all(is_token_char);

        valid.then_some(Self(token))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Boundary characters that are not MIME tspecials or whitespace.
const fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '\'' | '+' | '_' | '-' | '.')
}

impl Display for Boundary {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(&self.0)
    }
}

impl AsRef<str> for Boundary {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
