//! The letter aggregate and its `multipart/mixed` wire form.

use std::{
    io::{self, Write},
    sync::Arc,
};

use parking_lot::Mutex;

use super::{
    attachment::Attachment,
    boundary::Boundary,
    encoding::{base64_wrap, encoded_word, quoted_printable},
};

const CRLF: &[u8] = b"\r\n";

/// How the text part is written.
///
/// The text part always declares `Content-Transfer-Encoding:
/// quoted-printable`. [`BodyEncoding::Verbatim`] writes the body untouched,
/// which is byte-compatible with existing deployments; pick
/// [`BodyEncoding::QuotedPrintable`] for bodies that may contain `=` or long
/// lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyEncoding {
    #[default]
    Verbatim,
    QuotedPrintable,
}

/// Sender and recipients for the SMTP transaction, copied from a letter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub sender: String,
    pub recipients: Vec<String>,
    pub carbon_copy: Vec<String>,
}

impl Envelope {
    /// Every transaction recipient: primary recipients first, then copies.
    pub fn all_recipients(&self) -> impl Iterator<Item = &str> {
        self.recipients
            .iter()
            .chain(&self.carbon_copy)
            .map(String::as_str)
    }
}

#[derive(Debug, Default)]
struct Parts {
    subject: Option<String>,
    body: Option<String>,
    body_encoding: BodyEncoding,
    recipients: Vec<String>,
    carbon_copy: Vec<String>,
    attachments: Vec<Attachment>,
    wire: Option<Arc<[u8]>>,
}

impl Parts {
    /// Attachment filenames joined with `:`, the fallback subject and body.
    fn attachment_names(&self) -> String {
        self.attachments
            .iter()
            .map(Attachment::filename)
            .collect::<Vec<_>>()
            .join(":")
    }

    fn subject(&self) -> String {
        self.subject
            .clone()
            .unwrap_or_else(|| self.attachment_names())
    }

    fn body(&self) -> String {
        self.body.clone().unwrap_or_else(|| self.attachment_names())
    }

    fn estimated_len(&self) -> usize {
        let attachments: usize = self
            .attachments
            .iter()
            .map(|a| a.data().len() / 57 * 78 + 78 + 256)
            .sum();
        1024 + self.body.as_ref().map_or(0, String::len) + attachments
    }
}

/// An outgoing message.
///
/// All setters take `&self`: the mutable state sits behind a single lock, so
/// several threads may add recipients or attachments to the same letter.
/// [`Letter::build`] holds that lock while composing, so the wire form always
/// reflects one consistent snapshot.
#[derive(Debug)]
pub struct Letter {
    address: String,
    name: String,
    boundary: Boundary,
    parts: Mutex<Parts>,
}

impl Letter {
    /// Creates an empty letter from `name <address>`, delimited by `boundary`.
    #[must_use]
    pub fn new(address: impl Into<String>, name: impl Into<String>, boundary: Boundary) -> Self {
        Self {
            address: address.into(),
            name: name.into(),
            boundary,
            parts: Mutex::default(),
        }
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    pub fn set_subject(&self, subject: impl Into<String>) {
        self.parts.lock().subject = Some(subject.into());
    }

    pub fn set_body(&self, body: impl Into<String>) {
        self.parts.lock().body = Some(body.into());
    }

    pub fn set_body_encoding(&self, encoding: BodyEncoding) {
        self.parts.lock().body_encoding = encoding;
    }

    pub fn add_recipients<I>(&self, addresses: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.parts
            .lock()
            .recipients
            .extend(addresses.into_iter().map(Into::into));
    }

    pub fn add_carbon_copy<I>(&self, addresses: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.parts
            .lock()
            .carbon_copy
            .extend(addresses.into_iter().map(Into::into));
    }

    pub fn add_attachments(&self, attachments: impl IntoIterator<Item = Attachment>) {
        self.parts.lock().attachments.extend(attachments);
    }

    pub fn add_attachment(&self, filename: impl Into<String>, data: Vec<u8>) {
        self.add_attachments([Attachment::new(filename, data)]);
    }

    /// The subject as it will be written: the explicit one, or the
    /// attachment filenames joined with `:`.
    #[must_use]
    pub fn subject(&self) -> String {
        self.parts.lock().subject()
    }

    /// The body text before any transfer encoding, defaulting like
    /// [`Letter::subject`].
    #[must_use]
    pub fn body(&self) -> String {
        self.parts.lock().body()
    }

    #[must_use]
    pub fn recipients(&self) -> Vec<String> {
        self.parts.lock().recipients.clone()
    }

    #[must_use]
    pub fn carbon_copy(&self) -> Vec<String> {
        self.parts.lock().carbon_copy.clone()
    }

    #[must_use]
    pub fn attachment_count(&self) -> usize {
        self.parts.lock().attachments.len()
    }

    /// Number of RCPT TO commands a send will issue.
    #[must_use]
    pub fn recipient_count(&self) -> usize {
        let parts = self.parts.lock();
        parts.recipients.len() + parts.carbon_copy.len()
    }

    #[must_use]
    pub fn envelope(&self) -> Envelope {
        let parts = self.parts.lock();
        Envelope {
            sender: self.address.clone(),
            recipients: parts.recipients.clone(),
            carbon_copy: parts.carbon_copy.clone(),
        }
    }

    /// Composes the wire form, replacing any previous one, and returns it.
    pub fn build(&self) -> Arc<[u8]> {
        let mut parts = self.parts.lock();
        let wire: Arc<[u8]> = self.compose(&parts).into();
        parts.wire = Some(Arc::clone(&wire));
        wire
    }

    /// The last built wire form, if any.
    #[must_use]
    pub fn wire(&self) -> Option<Arc<[u8]>> {
        self.parts.lock().wire.clone()
    }

    /// Writes the wire form to `out`, building it first if needed.
    pub fn dump(&self, out: &mut impl Write) -> io::Result<()> {
        let wire = self.wire().unwrap_or_else(|| self.build());
        out.write_all(&wire)?;
        out.flush()
    }

    fn compose(&self, parts: &Parts) -> Vec<u8> {
        let boundary = self.boundary.as_str();
        let mut out = Vec::with_capacity(parts.estimated_len());

        line(&mut out, format!("From: {} <{}>", self.name, self.address));
        line(&mut out, format!("To: {}", parts.recipients.join(",")));
        line(&mut out, format!("CC: {}", parts.carbon_copy.join(",")));
        line(&mut out, format!("Subject: {}", parts.subject()));
        line(&mut out, "MIME-Version: 1.0");
        line(
            &mut out,
            format!("Content-Type: multipart/mixed; boundary={boundary}"),
        );
        line(&mut out, "");

        line(&mut out, format!("--{boundary}"));
        line(&mut out, "Content-Type: text/plain; charset=UTF-8");
        line(&mut out, "Content-Transfer-Encoding: quoted-printable");
        line(&mut out, "");
        match parts.body_encoding {
            BodyEncoding::Verbatim => line(&mut out, parts.body()),
            BodyEncoding::QuotedPrintable => line(&mut out, quoted_printable(&parts.body())),
        }

        for attachment in &parts.attachments {
            let name = encoded_word(attachment.filename());

            line(&mut out, format!("--{boundary}"));
            line(
                &mut out,
                format!("Content-Type: application/octet-stream; charset=UTF-8; name=\"{name}\""),
            );
            line(&mut out, "Content-Transfer-Encoding: base64");
            line(
                &mut out,
                format!("Content-Disposition: attachment; filename=\"{name}\""),
            );
            line(&mut out, "");
            base64_wrap(&mut out, attachment.data());
        }

        line(&mut out, format!("--{boundary}--"));
        out
    }
}

fn line(out: &mut Vec<u8>, text: impl AsRef<[u8]>) {
    out.extend_from_slice(text.as_ref());
    out.extend_from_slice(CRLF);
}
