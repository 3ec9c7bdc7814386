//! Error types for the SMTP client.

use core::fmt::{self, Display};
use std::{io, time::Duration};

use thiserror::Error;

/// Errors that can occur when talking to the server.
#[derive(Error, Debug)]
pub enum ClientError {
    /// IO error occurred during network operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Failed to parse an SMTP response from the server.
    #[error("Failed to parse SMTP response: {0}")]
    ParseError(String),

    /// The server replied with a code the command does not accept.
    #[error("SMTP error: {code} {message}")]
    SmtpError { code: u16, message: String },

    /// TLS/SSL error occurred.
    #[error("TLS error: {0}")]
    TlsError(String),

    /// Credentials were withheld because sending them would be unsafe.
    #[error("Authentication refused: {0}")]
    AuthRefused(String),

    /// Connection was closed unexpectedly.
    #[error("Connection closed unexpectedly")]
    ConnectionClosed,

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8Error(#[from] std::str::Utf8Error),
}

impl ClientError {
    /// The server's reply code, when the server rejected a command.
    #[must_use]
    pub const fn reply_code(&self) -> Option<u16> {
        match self {
            Self::SmtpError { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Specialized `Result` type for SMTP client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// The steps of a send, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Connect,
    Greeting,
    Hello,
    Auth,
    MailFrom,
    RcptTo,
    Data,
    Quit,
    /// The whole session, used for the overall deadline.
    Transaction,
}

impl Display for Stage {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(match self {
            Self::Connect => "connect",
            Self::Greeting => "greeting",
            Self::Hello => "EHLO/HELO",
            Self::Auth => "AUTH",
            Self::MailFrom => "MAIL FROM",
            Self::RcptTo => "RCPT TO",
            Self::Data => "DATA",
            Self::Quit => "QUIT",
            Self::Transaction => "transaction",
        })
    }
}

/// The first failure of a send, tagged with the step that hit it.
///
/// The underlying [`ClientError`] is kept as the error source, unmodified.
#[derive(Error, Debug)]
pub enum SendError {
    /// A step failed.
    #[error("{stage} failed: {source}")]
    Failed {
        stage: Stage,
        #[source]
        source: ClientError,
    },

    /// The server refused one of the recipients.
    #[error("RCPT TO <{recipient}> failed: {source}")]
    Recipient {
        recipient: String,
        #[source]
        source: ClientError,
    },

    /// A step did not finish in time.
    #[error("{stage} timed out after {after:?}")]
    Timeout { stage: Stage, after: Duration },
}

impl SendError {
    #[must_use]
    pub const fn failed(stage: Stage, source: ClientError) -> Self {
        Self::Failed { stage, source }
    }

    /// The step that failed.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Failed { stage, .. } | Self::Timeout { stage, .. } => *stage,
            Self::Recipient { .. } => Stage::RcptTo,
        }
    }

    /// The underlying client error, if the step did not time out.
    #[must_use]
    pub const fn client_error(&self) -> Option<&ClientError> {
        match self {
            Self::Failed { source, .. } | Self::Recipient { source, .. } => Some(source),
            Self::Timeout { .. } => None,
        }
    }

    #[must_use]
    pub fn reply_code(&self) -> Option<u16> {
        self.client_error().and_then(ClientError::reply_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_error_exposes_source() {
        let err = SendError::Recipient {
            recipient: "b@example.com".to_string(),
            source: ClientError::SmtpError {
                code: 550,
                message: "No such user".to_string(),
            },
        };

        assert_eq!(err.stage(), Stage::RcptTo);
        assert_eq!(err.reply_code(), Some(550));
        assert_eq!(
            err.to_string(),
            "RCPT TO <b@example.com> failed: SMTP error: 550 No such user"
        );
    }

    #[test]
    fn test_timeout_has_no_source() {
        let err = SendError::Timeout {
            stage: Stage::Data,
            after: Duration::from_secs(2),
        };
        assert!(err.client_error().is_none());
        assert_eq!(err.to_string(), "DATA timed out after 2s");
    }

    #[test]
    fn test_stages_are_ordered() {
        assert!(Stage::Connect < Stage::Auth);
        assert!(Stage::RcptTo < Stage::Data);
        assert!(Stage::Data < Stage::Quit);
    }
}
