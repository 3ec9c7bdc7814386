//! Mock SMTP server for exercising the sender end to end.
//!
//! The server speaks plain TCP on a loopback port, or implicit TLS with a
//! freshly generated self-signed certificate for `localhost`. It records
//! every command it sees, and can be told to reject or stall individual steps.
#![allow(dead_code)] // Not every test uses every knob

use std::{
    fmt::Write,
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    net::TcpListener,
    sync::RwLock,
    time::timeout,
};
use tokio_rustls::{
    TlsAcceptor,
    rustls::{
        ServerConfig,
        pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer},
    },
};

/// Something the mock server observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmtpCommand {
    Ehlo(String),
    Helo(String),
    /// AUTH with everything after the keyword
    Auth(String),
    MailFrom(String),
    RcptTo(String),
    Data,
    /// Message content after DATA, with dot-stuffing undone
    MessageContent(Vec<u8>),
    Quit,
    Other(String),
    /// The client closed the connection
    Disconnected,
}

#[derive(Debug, Clone)]
pub struct SmtpResponse {
    pub code: u16,
    pub message: String,
}

impl SmtpResponse {
    fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        format!("{} {}\r\n", self.code, self.message).into_bytes()
    }
}

#[derive(Clone)]
struct EhloResponse {
    code: u16,
    capabilities: Vec<String>,
}

impl EhloResponse {
    fn to_bytes(&self) -> Vec<u8> {
        let mut response = String::new();
        let last = self.capabilities.len().saturating_sub(1);

        for (i, cap) in self.capabilities.iter().enumerate() {
            let separator = if i < last { '-' } else { ' ' };
            let _ = write!(&mut response, "{}{separator}{cap}\r\n", self.code);
        }

        response.into_bytes()
    }
}

#[derive(Clone)]
struct MockServerConfig {
    greeting: SmtpResponse,
    ehlo_response: EhloResponse,
    helo_response: SmtpResponse,
    auth_response: SmtpResponse,
    mail_from_response: SmtpResponse,
    rcpt_to_response: SmtpResponse,
    rcpt_failure: Option<(usize, SmtpResponse)>,
    data_response: SmtpResponse,
    data_end_response: SmtpResponse,
    quit_response: SmtpResponse,
    stall_on_command: Option<usize>,
}

impl Default for MockServerConfig {
    fn default() -> Self {
        Self {
            greeting: SmtpResponse::new(220, "Mock SMTP Server"),
            ehlo_response: EhloResponse {
                code: 250,
                capabilities: vec![
                    "mock.example.com".to_string(),
                    "AUTH LOGIN PLAIN".to_string(),
                    "8BITMIME".to_string(),
                ],
            },
            helo_response: SmtpResponse::new(250, "Hello"),
            auth_response: SmtpResponse::new(235, "Authentication successful"),
            mail_from_response: SmtpResponse::new(250, "OK"),
            rcpt_to_response: SmtpResponse::new(250, "OK"),
            rcpt_failure: None,
            data_response: SmtpResponse::new(354, "End data with <CR><LF>.<CR><LF>"),
            data_end_response: SmtpResponse::new(250, "OK: Message accepted"),
            quit_response: SmtpResponse::new(221, "Bye"),
            stall_on_command: None,
        }
    }
}

pub struct MockSmtpServer {
    addr: SocketAddr,
    commands_received: Arc<RwLock<Vec<SmtpCommand>>>,
    shutdown: Arc<AtomicBool>,
}

impl MockSmtpServer {
    #[must_use]
    pub fn builder() -> MockSmtpServerBuilder {
        MockSmtpServerBuilder::new()
    }

    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub async fn commands(&self) -> Vec<SmtpCommand> {
        self.commands_received.read().await.clone()
    }

    /// Waits until the client has hung up, then returns everything seen.
    pub async fn finished_commands(&self) -> Vec<SmtpCommand> {
        for _ in 0..200 {
            let commands = self.commands().await;
            if commands.contains(&SmtpCommand::Disconnected) {
                return commands;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.commands().await
    }

    /// The message content received after DATA, if any.
    pub async fn message(&self) -> Option<Vec<u8>> {
        self.finished_commands()
            .await
            .into_iter()
            .find_map(|command| match command {
                SmtpCommand::MessageContent(content) => Some(content),
                _ => None,
            })
    }

    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    async fn reply(
        writer: &mut (impl AsyncWriteExt + Unpin),
        bytes: &[u8],
    ) -> Result<(), std::io::Error> {
        writer.write_all(bytes).await?;
        writer.flush().await
    }

    #[allow(clippy::too_many_lines)]
    async fn handle_client<S>(
        stream: S,
        config: Arc<MockServerConfig>,
        commands: Arc<RwLock<Vec<SmtpCommand>>>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let (reader, mut writer) = tokio::io::split(stream);
        let mut reader = BufReader::new(reader);
        let mut line = String::new();
        let mut command_index = 0;
        let mut rcpt_index = 0;

        Self::reply(&mut writer, &config.greeting.to_bytes()).await?;

        loop {
            line.clear();

            if config.stall_on_command == Some(command_index) {
                // Keep reading so a client hang-up is still noticed
                let _ = reader.read_line(&mut line).await;
                let mut rest = String::new();
                while reader.read_line(&mut rest).await? > 0 {
                    rest.clear();
                }
                return Ok(());
            }

            let read_result = timeout(Duration::from_secs(10), reader.read_line(&mut line)).await;
            let Ok(bytes_read) = read_result else {
                return Ok(());
            };
            if bytes_read? == 0 {
                return Ok(());
            }
            command_index += 1;

            let cmd_line = line.trim_end();
            let (verb, argument) = cmd_line.split_once(' ').unwrap_or((cmd_line, ""));

            let (response, smtp_cmd) = match verb.to_uppercase().as_str() {
                "EHLO" => (
                    config.ehlo_response.to_bytes(),
                    SmtpCommand::Ehlo(argument.to_string()),
                ),
                "HELO" => (
                    config.helo_response.to_bytes(),
                    SmtpCommand::Helo(argument.to_string()),
                ),
                "AUTH" => (
                    config.auth_response.to_bytes(),
                    SmtpCommand::Auth(argument.to_string()),
                ),
                "MAIL" => (
                    config.mail_from_response.to_bytes(),
                    SmtpCommand::MailFrom(argument.to_string()),
                ),
                "RCPT" => {
                    let response = match &config.rcpt_failure {
                        Some((index, failure)) if *index == rcpt_index => failure.to_bytes(),
                        _ => config.rcpt_to_response.to_bytes(),
                    };
                    rcpt_index += 1;
                    (response, SmtpCommand::RcptTo(argument.to_string()))
                }
                "DATA" => (config.data_response.to_bytes(), SmtpCommand::Data),
                "QUIT" => {
                    commands.write().await.push(SmtpCommand::Quit);
                    Self::reply(&mut writer, &config.quit_response.to_bytes()).await?;
                    continue;
                }
                _ => (
                    SmtpResponse::new(500, "Unknown command").to_bytes(),
                    SmtpCommand::Other(cmd_line.to_string()),
                ),
            };

            commands.write().await.push(smtp_cmd.clone());
            Self::reply(&mut writer, &response).await?;

            if matches!(smtp_cmd, SmtpCommand::Data) && config.data_response.code == 354 {
                let mut content = Vec::new();
                let mut data_line = Vec::new();

                loop {
                    data_line.clear();
                    if reader.read_until(b'\n', &mut data_line).await? == 0 {
                        return Ok(());
                    }
                    if data_line == b".\r\n" {
                        break;
                    }
                    let unstuffed = data_line.strip_prefix(b".").unwrap_or(data_line.as_slice());
                    content.extend_from_slice(unstuffed);
                }

                commands
                    .write()
                    .await
                    .push(SmtpCommand::MessageContent(content));
                Self::reply(&mut writer, &config.data_end_response.to_bytes()).await?;
            }
        }
    }
}

/// A TLS acceptor presenting a self-signed certificate for `localhost`.
fn self_signed_acceptor() -> Result<TlsAcceptor, Box<dyn std::error::Error + Send + Sync>> {
    let cert = rcgen::generate_simple_self_signed(vec!["localhost".to_string()])?;
    let chain = vec![CertificateDer::from(cert.serialize_der()?)];
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(cert.serialize_private_key_der()));

    let config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(chain, key)?;

    Ok(TlsAcceptor::from(Arc::new(config)))
}

pub struct MockSmtpServerBuilder {
    config: MockServerConfig,
    tls: bool,
}

impl MockSmtpServerBuilder {
    fn new() -> Self {
        Self {
            config: MockServerConfig::default(),
            tls: false,
        }
    }

    /// Serve implicit TLS with a self-signed certificate for `localhost`
    #[must_use]
    pub const fn with_tls(mut self) -> Self {
        self.tls = true;
        self
    }

    #[must_use]
    pub fn with_greeting(mut self, code: u16, message: impl Into<String>) -> Self {
        self.config.greeting = SmtpResponse::new(code, message);
        self
    }

    /// Replace the EHLO reply; the first entry is the server's domain
    #[must_use]
    pub fn with_ehlo_response(mut self, code: u16, capabilities: Vec<String>) -> Self {
        self.config.ehlo_response = EhloResponse { code, capabilities };
        self
    }

    /// EHLO reply without an AUTH line
    #[must_use]
    pub fn without_auth(self) -> Self {
        self.with_ehlo_response(250, vec!["mock.example.com".to_string()])
    }

    #[must_use]
    pub fn with_auth_response(mut self, code: u16, message: impl Into<String>) -> Self {
        self.config.auth_response = SmtpResponse::new(code, message);
        self
    }

    #[must_use]
    pub fn with_mail_from_response(mut self, code: u16, message: impl Into<String>) -> Self {
        self.config.mail_from_response = SmtpResponse::new(code, message);
        self
    }

    /// Reject the RCPT with this zero-based index
    #[must_use]
    pub fn with_rcpt_failure_on(mut self, index: usize, code: u16, message: impl Into<String>) -> Self {
        self.config.rcpt_failure = Some((index, SmtpResponse::new(code, message)));
        self
    }

    #[must_use]
    pub fn with_data_response(mut self, code: u16, message: impl Into<String>) -> Self {
        self.config.data_response = SmtpResponse::new(code, message);
        self
    }

    #[must_use]
    pub fn with_data_end_response(mut self, code: u16, message: impl Into<String>) -> Self {
        self.config.data_end_response = SmtpResponse::new(code, message);
        self
    }

    #[must_use]
    pub fn with_quit_response(mut self, code: u16, message: impl Into<String>) -> Self {
        self.config.quit_response = SmtpResponse::new(code, message);
        self
    }

    /// Stop answering once this many commands have been handled
    #[must_use]
    pub const fn with_stall_on_command(mut self, command_index: usize) -> Self {
        self.config.stall_on_command = Some(command_index);
        self
    }

    /// Bind a loopback port and start serving
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to a port or the
    /// certificate cannot be generated
    pub async fn build(self) -> Result<MockSmtpServer, Box<dyn std::error::Error + Send + Sync>> {
        let acceptor = if self.tls {
            Some(self_signed_acceptor()?)
        } else {
            None
        };

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let config = Arc::new(self.config);
        let commands = Arc::new(RwLock::new(Vec::new()));
        let shutdown = Arc::new(AtomicBool::new(false));

        let commands_clone = Arc::clone(&commands);
        let shutdown_clone = Arc::clone(&shutdown);

        tokio::spawn(async move {
            loop {
                if shutdown_clone.load(Ordering::Relaxed) {
                    break;
                }

                let accept_result = timeout(Duration::from_millis(100), listener.accept()).await;

                if let Ok(Ok((stream, _peer))) = accept_result {
                    let config = Arc::clone(&config);
                    let commands = Arc::clone(&commands_clone);
                    let acceptor = acceptor.clone();

                    tokio::spawn(async move {
                        let result = match acceptor {
                            Some(acceptor) => match acceptor.accept(stream).await {
                                Ok(stream) => {
                                    MockSmtpServer::handle_client(
                                        stream,
                                        config,
                                        Arc::clone(&commands),
                                    )
                                    .await
                                }
                                Err(e) => Err(e.into()),
                            },
                            None => {
                                MockSmtpServer::handle_client(stream, config, Arc::clone(&commands))
                                    .await
                            }
                        };
                        if let Err(e) = result {
                            tracing::debug!("Mock server client error: {e}");
                        }
                        commands.write().await.push(SmtpCommand::Disconnected);
                    });
                }
            }
        });

        Ok(MockSmtpServer {
            addr,
            commands_received: commands,
            shutdown,
        })
    }
}
