//! SMTP submission client.
//!
//! [`Sender`] drives one complete session per letter: connect over implicit
//! TLS, greet, authenticate with `AUTH PLAIN` when offered, then MAIL, RCPT,
//! DATA and QUIT. [`SmtpClient`] is the connection underneath it, one command
//! at a time.
//!
//! # Examples
//!
//! ```no_run
//! use courier_common::config::{Credentials, ServerAddress};
//! use courier_smtp::client::Sender;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let sender = Sender::new(
//!     ServerAddress::parse("smtp.example.com:465")?,
//!     Credentials::parse("me@example.com:secret")?,
//!     "Me",
//! );
//!
//! let letter = sender.new_letter();
//! letter.add_recipients(["me@example.com"]);
//! letter.add_attachment("notes.txt", b"hello".to_vec());
//!
//! sender.send(&letter).await?;
//! # Ok(())
//! # }
//! ```

mod auth;
mod capabilities;
mod data;
mod error;
mod response;
mod sender;
mod smtp_client;

pub use auth::{PlainAuth, ServerInfo};
pub use capabilities::Capabilities;
pub use data::dot_stuff;
pub use error::{ClientError, Result, SendError, Stage};
pub use response::{Response, ResponseLine};
pub use sender::{DEFAULT_HELO_DOMAIN, Sender};
pub use smtp_client::SmtpClient;
