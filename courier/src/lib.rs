//! Send files as mail attachments over authenticated SMTPS.
//!
//! The [`cli`] module turns command-line and environment configuration into
//! a [`courier_smtp::Sender`] and a [`courier_smtp::Letter`], and maps every
//! way that can fail onto a stable exit code.

pub mod cli;

pub use cli::{Cli, Failure};
