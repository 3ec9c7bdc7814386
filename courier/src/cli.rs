use std::{iter, path::PathBuf};

use clap::Parser;
use courier_common::{
    config::{ConfigError, Credentials, DEFAULT_SERVER, ServerAddress, SessionConfig},
    internal,
};
use courier_smtp::{
    client::{SendError, Sender},
    mime::{Attachment, AttachmentError, BodyEncoding, Letter},
};
use thiserror::Error;

/// Environment variable holding `host:port`.
pub const SERVER_VAR: &str = "COURIER_SERVER";

/// Environment variable holding `address:secret`.
pub const CREDENTIALS_VAR: &str = "COURIER_CREDENTIALS";

/// Environment variable holding the path of a RON session config file.
pub const CONFIG_VAR: &str = "COURIER_CONFIG";

/// Send files as mail attachments over SMTPS
#[derive(Parser, Debug, Clone)]
#[command(name = "courier", version)]
#[command(about = "Send files as mail attachments over SMTPS", long_about = None)]
#[command(after_help = "Example:\n  export COURIER_CREDENTIALS=me@163.com:secret\n  courier -p notes.7z [more.zip]")]
pub struct Cli {
    /// Mail server as host:port
    #[arg(long, env = SERVER_VAR, default_value = DEFAULT_SERVER)]
    pub server: String,

    /// Sender mailbox and secret as address:secret
    #[arg(long, env = CREDENTIALS_VAR, hide_env_values = true)]
    pub credentials: Option<String>,

    /// Sender display name
    #[arg(long, default_value = "you")]
    pub name: String,

    /// Additional recipient, after the sender's own address
    #[arg(long, value_name = "ADDRESS")]
    pub to: Vec<String>,

    /// Carbon-copy recipient
    #[arg(long, value_name = "ADDRESS")]
    pub cc: Vec<String>,

    /// Subject line (default: the attachment names joined with ':')
    #[arg(long)]
    pub subject: Option<String>,

    /// Body text (default: the attachment names joined with ':')
    #[arg(long)]
    pub body: Option<String>,

    /// Quoted-printable encode the body
    #[arg(long)]
    pub encode_body: bool,

    /// RON file with transport and timeout settings
    #[arg(long, env = CONFIG_VAR, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Give up on the whole send after this many seconds (overrides the config file)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Print the message before sending it
    #[arg(short, long)]
    pub print: bool,

    /// Files to attach
    pub files: Vec<PathBuf>,
}

/// Why a run ended early. Each kind has its own exit code.
#[derive(Debug, Error)]
pub enum Failure {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Attachment(#[from] AttachmentError),

    #[error(transparent)]
    Send(#[from] SendError),
}

impl Failure {
    /// `1` for credentials or the config file, `2` for a malformed port, `3` for an unreadable
    /// attachment and `4` for a failed send.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(err) if err.is_port_error() => 2,
            Self::Config(_) => 1,
            Self::Attachment(_) => 3,
            Self::Send(_) => 4,
        }
    }
}

impl Cli {
    /// Without any files there is nothing to send, so only usage is shown.
    #[must_use]
    pub fn wants_usage(&self) -> bool {
        self.files.is_empty()
    }

    /// Reads the session config file, if one was given.
    pub fn session(&self) -> Result<SessionConfig, Failure> {
        let mut session = match &self.config {
            Some(path) => SessionConfig::load(path)?,
            None => SessionConfig::default(),
        };

        if let Some(secs) = self.timeout {
            session.timeouts = session.timeouts.with_transaction_secs(secs);
        }

        Ok(session)
    }

    /// Builds the sender. Credentials are checked before the server address,
    /// and both before the config file.
    pub fn sender(&self) -> Result<Sender, Failure> {
        let credentials = self
            .credentials
            .as_deref()
            .ok_or(ConfigError::MissingCredentials(CREDENTIALS_VAR))
            .and_then(Credentials::parse)?;
        let server = ServerAddress::parse(&self.server)?;

        let session = self.session()?;

        Ok(Sender::new(server, credentials, self.name.clone())
            .with_transport(session.transport)
            .with_timeouts(session.timeouts))
    }

    /// Reads every attachment and assembles the letter.
    ///
    /// The sender's own address is always the first recipient.
    pub async fn compose(&self, sender: &Sender) -> Result<Letter, Failure> {
        let letter = sender.new_letter();
        letter.add_recipients(
            iter::once(sender.address()).chain(self.to.iter().map(String::as_str)),
        );
        letter.add_carbon_copy(self.cc.iter().map(String::as_str));

        for path in &self.files {
            let attachment = Attachment::from_path(path).await?;
            internal!(
                level = DEBUG,
                "Attached {} ({} bytes)",
                attachment.filename(),
                attachment.data().len()
            );
            letter.add_attachments([attachment]);
        }

        if let Some(subject) = &self.subject {
            letter.set_subject(subject.as_str());
        }
        if let Some(body) = &self.body {
            letter.set_body(body.as_str());
        }
        if self.encode_body {
            letter.set_body_encoding(BodyEncoding::QuotedPrintable);
        }

        Ok(letter)
    }
}

/// Composes and sends one letter as `cli` describes.
pub async fn run(cli: &Cli) -> Result<(), Failure> {
    let sender = cli.sender()?;
    let letter = cli.compose(&sender).await?;

    if cli.print {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = letter.dump(&mut stdout) {
            tracing::warn!("Unable to print the message: {e}");
        }
    }

    sender.send(&letter).await?;
    Ok(())
}
