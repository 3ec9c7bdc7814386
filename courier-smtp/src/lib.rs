//! Composing multipart mail with attachments and submitting it over SMTP.
//!
//! [`mime`] builds the message bytes; [`client`] delivers them.

pub mod client;
pub mod mime;

pub use client::{SendError, Sender};
pub use mime::{Attachment, Letter};
