//! SMTP mail transport
//!
//! [`MailTransport`] implementation over an authenticated STARTTLS SMTP
//! relay: plain-text body plus the spreadsheet artifact as an attachment.

use super::{MailTransport, OutgoingReport, TransportError};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, Message, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials as SmtpCredentials;
use lettre::{SmtpTransport, Transport};
use tracing::debug;

/// MIME type of the xlsx attachment.
const XLSX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Authenticated SMTP relay transport.
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    host: String,
    port: u16,
    username: String,
    password: String,
}

impl SmtpMailer {
    /// Create a mailer for the given relay and account.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password: password.into(),
        }
    }

    fn mailbox(address: &str, role: &str) -> Result<Mailbox, TransportError> {
        address
            .parse()
            .map_err(|e| TransportError::Address(format!("{role} {address}: {e}")))
    }
}

impl MailTransport for SmtpMailer {
    fn send(&self, report: &OutgoingReport) -> Result<(), TransportError> {
        let from = Self::mailbox(&report.sender, "sender")?;
        let to = Self::mailbox(&report.recipient, "recipient")?;

        let content_type = ContentType::parse(XLSX_MIME)
            .map_err(|e| TransportError::Message(e.to_string()))?;
        let attachment = Attachment::new(report.attachment_name.clone())
            .body(report.attachment.clone(), content_type);

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(report.subject.clone())
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(report.body.clone()))
                    .singlepart(attachment),
            )
            .map_err(|e| TransportError::Message(e.to_string()))?;

        let mailer = SmtpTransport::starttls_relay(&self.host)
            .map_err(|e| TransportError::Transport(e.to_string()))?
            .port(self.port)
            .credentials(SmtpCredentials::new(
                self.username.clone(),
                self.password.clone(),
            ))
            .build();

        debug!(host = %self.host, port = self.port, "sending report over SMTP");
        mailer
            .send(&message)
            .map_err(|e| TransportError::Transport(e.to_string()))?;
        Ok(())
    }
}
