//! Delivery of one letter over one SMTP session.
//!
//! The session runs these steps strictly in order, stopping at the first
//! failure:
//! 1. Connect (TLS handshake included) and read the 220 greeting
//! 2. EHLO, falling back to HELO
//! 3. `AUTH PLAIN`, if the server advertises AUTH
//! 4. MAIL FROM
//! 5. RCPT TO for every recipient, then every carbon copy
//! 6. DATA and the message
//! 7. QUIT
//!
//! The connection is closed exactly once whichever way the session ends.

use std::{future::Future, time::Duration};

use courier_common::{
    config::{ClientTimeouts, Credentials, ServerAddress, TransportConfig},
    tracing,
};

use super::{
    auth::PlainAuth,
    capabilities::Capabilities,
    error::{ClientError, SendError, Stage},
    response::Response,
    smtp_client::SmtpClient,
};
use crate::mime::{Boundary, Envelope, Letter};

/// Name announced in EHLO/HELO.
pub const DEFAULT_HELO_DOMAIN: &str = "localhost";

/// Runs one step with a deadline and checks the reply code.
async fn exchange<F>(
    stage: Stage,
    after: Duration,
    accepted: &[u16],
    step: F,
) -> Result<Response, SendError>
where
    F: Future<Output = Result<Response, ClientError>>,
{
    let reply = tokio::time::timeout(after, step)
        .await
        .map_err(|_| SendError::Timeout { stage, after })?;

    reply
        .and_then(|response| response.expect(accepted))
        .map_err(|source| SendError::failed(stage, source))
}

/// A configured mail account: where to deliver, as whom, and how.
///
/// A `Sender` hands out [`Letter`]s with [`Sender::new_letter`] and delivers
/// them with [`Sender::send`].
#[derive(Debug, Clone)]
pub struct Sender {
    server: ServerAddress,
    credentials: Credentials,
    name: String,
    transport: TransportConfig,
    timeouts: ClientTimeouts,
    boundary: Boundary,
}

impl Sender {
    /// A sender using implicit TLS, default timeouts and the process-wide
    /// boundary.
    #[must_use]
    pub fn new(server: ServerAddress, credentials: Credentials, name: impl Into<String>) -> Self {
        Self {
            server,
            credentials,
            name: name.into(),
            transport: TransportConfig::default(),
            timeouts: ClientTimeouts::default(),
            boundary: Boundary::process().clone(),
        }
    }

    #[must_use]
    pub const fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    #[must_use]
    pub fn with_timeouts(mut self, timeouts: ClientTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Delimits letters from this sender with `boundary` instead of the
    /// process-wide one.
    #[must_use]
    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    #[must_use]
    pub const fn server(&self) -> &ServerAddress {
        &self.server
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.credentials.address
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn timeouts(&self) -> &ClientTimeouts {
        &self.timeouts
    }

    #[must_use]
    pub const fn transport(&self) -> TransportConfig {
        self.transport
    }

    /// An empty letter from this account.
    #[must_use]
    pub fn new_letter(&self) -> Letter {
        Letter::new(&self.credentials.address, &self.name, self.boundary.clone())
    }

    /// Builds `letter` and delivers it.
    ///
    /// Returns the first failure; nothing is retried and no recipient is
    /// delivered to unless every step succeeds.
    #[tracing::instrument(
        level = "info",
        skip_all,
        fields(server = %self.server, recipients = letter.recipient_count())
    )]
    pub async fn send(&self, letter: &Letter) -> Result<(), SendError> {
        let payload = letter.build();
        let envelope = letter.envelope();
        let deadline = self.timeouts.transaction();

        tokio::time::timeout(deadline, self.deliver(&envelope, &payload))
            .await
            .map_err(|_| SendError::Timeout {
                stage: Stage::Transaction,
                after: deadline,
            })??;

        tracing::info!(bytes = payload.len(), "Message delivered");
        Ok(())
    }

    async fn deliver(&self, envelope: &Envelope, payload: &[u8]) -> Result<(), SendError> {
        let after = self.timeouts.connect();
        let mut client = tokio::time::timeout(after, SmtpClient::connect(&self.server, self.transport))
            .await
            .map_err(|_| SendError::Timeout {
                stage: Stage::Connect,
                after,
            })?
            .map_err(|source| SendError::failed(Stage::Connect, source))?;

        let outcome = self.transact(&mut client, envelope, payload).await;
        if let Err(e) = &outcome {
            tracing::warn!(stage = %e.stage(), "Delivery failed: {e}");
        }

        // A close that outlives its deadline is abandoned; dropping the
        // client releases the socket either way.
        let _ = tokio::time::timeout(self.timeouts.quit(), client.close()).await;
        outcome
    }

    async fn transact(
        &self,
        client: &mut SmtpClient,
        envelope: &Envelope,
        payload: &[u8],
    ) -> Result<(), SendError> {
        let timeouts = &self.timeouts;

        exchange(
            Stage::Greeting,
            timeouts.greeting(),
            &[220],
            client.read_greeting(),
        )
        .await?;

        let capabilities = self.hello(client).await?;

        if capabilities.supports("AUTH") {
            let auth = PlainAuth::new(self.credentials.clone(), &self.server.host);
            exchange(Stage::Auth, timeouts.auth(), &[235], client.auth_plain(&auth)).await?;
            tracing::debug!("Authenticated as {}", self.credentials.address);
        }

        exchange(
            Stage::MailFrom,
            timeouts.mail_from(),
            &[250],
            client.mail_from(&envelope.sender),
        )
        .await?;

        for recipient in envelope.all_recipients() {
            exchange(
                Stage::RcptTo,
                timeouts.rcpt_to(),
                &[250, 251],
                client.rcpt_to(recipient),
            )
            .await
            .map_err(|e| match e {
                SendError::Failed { source, .. } => SendError::Recipient {
                    recipient: recipient.to_string(),
                    source,
                },
                other => other,
            })?;
        }

        exchange(Stage::Data, timeouts.data(), &[354], client.data()).await?;
        exchange(
            Stage::Data,
            timeouts.data(),
            &[250],
            client.send_data(payload),
        )
        .await?;

        exchange(Stage::Quit, timeouts.quit(), &[221], client.quit()).await?;
        Ok(())
    }

    /// EHLO, or HELO if the server rejects EHLO. A HELO session has no
    /// extensions.
    async fn hello(&self, client: &mut SmtpClient) -> Result<Capabilities, SendError> {
        let after = self.timeouts.ehlo();

        match exchange(Stage::Hello, after, &[250], client.ehlo(DEFAULT_HELO_DOMAIN)).await {
            Ok(reply) => Ok(Capabilities::from_ehlo(&reply)),
            Err(SendError::Failed {
                source: ClientError::SmtpError { code, .. },
                ..
            }) => {
                tracing::debug!(code, "EHLO rejected, falling back to HELO");
                exchange(Stage::Hello, after, &[250], client.helo(DEFAULT_HELO_DOMAIN)).await?;
                Ok(Capabilities::default())
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender() -> Sender {
        Sender::new(
            ServerAddress::new("smtp.example.com", 465),
            Credentials::new("me@example.com", "hunter2"),
            "Me",
        )
    }

    #[test]
    fn test_new_letter_copies_identity() {
        let letter = sender().new_letter();
        assert_eq!(letter.address(), "me@example.com");
        assert_eq!(letter.name(), "Me");
        assert_eq!(letter.boundary(), Boundary::process());
    }

    #[test]
    fn test_injected_boundary() {
        let boundary = Boundary::from_token("fixed").unwrap();
        let letter = sender().with_boundary(boundary.clone()).new_letter();
        assert_eq!(letter.boundary(), &boundary);
    }

    #[test]
    fn test_debug_hides_secret() {
        assert!(!format!("{:?}", sender()).contains("hunter2"));
    }
}
