//! Report delivery
//!
//! Validates the recipient address, reads the generated artifact and hands
//! it to a [`MailTransport`] in a single attempt. Transport internals live
//! behind the trait so tests can record calls and the SMTP implementation
//! can be swapped out.

pub mod smtp;

pub use smtp::SmtpMailer;

use chrono::NaiveDate;
use email_address::EmailAddress;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// A fully composed outgoing report message.
#[derive(Debug, Clone)]
pub struct OutgoingReport {
    /// Sender address
    pub sender: String,
    /// Recipient address (already validated)
    pub recipient: String,
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub body: String,
    /// File name the attachment is presented under
    pub attachment_name: String,
    /// Attachment bytes
    pub attachment: Vec<u8>,
}

/// Failures inside a mail transport implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// A mail address could not be parsed by the transport
    #[error("invalid mail address: {0}")]
    Address(String),

    /// The message could not be assembled
    #[error("failed to build the mail message: {0}")]
    Message(String),

    /// Connection, authentication or protocol failure while sending
    #[error("mail transport failure: {0}")]
    Transport(String),
}

/// One-shot authenticated mail delivery.
pub trait MailTransport {
    /// Send the composed report. One attempt; no retry.
    fn send(&self, report: &OutgoingReport) -> Result<(), TransportError>;
}

/// Delivery step failures.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The recipient address is not syntactically well-formed;
    /// no transport call is attempted
    #[error("recipient address is not well-formed: {0}")]
    InvalidRecipient(String),

    /// The artifact could not be read or the transport failed
    #[error("report delivery failed: {details}")]
    DeliveryFailed {
        /// Underlying read/transport failure
        details: String,
    },
}

/// Terminal result of a delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    /// Whether the report reached the transport successfully
    pub delivered: bool,
    /// Failure description when not delivered
    pub failure_reason: Option<String>,
}

impl DeliveryOutcome {
    /// Successful delivery.
    pub fn delivered() -> Self {
        Self { delivered: true, failure_reason: None }
    }

    /// Failed delivery with a reason.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self { delivered: false, failure_reason: Some(reason.into()) }
    }
}

impl From<Result<(), DeliveryError>> for DeliveryOutcome {
    fn from(result: Result<(), DeliveryError>) -> Self {
        match result {
            Ok(()) => Self::delivered(),
            Err(e) => Self::failed(e.to_string()),
        }
    }
}

/// Fallback attachment name when the artifact path has no usable file name.
const DEFAULT_ATTACHMENT_NAME: &str = "report.xlsx";

/// Orchestrates the validate → read → send delivery step.
#[derive(Debug, Clone)]
pub struct DeliveryCoordinator {
    sender: String,
    subject_template: String,
    body_template: String,
}

impl DeliveryCoordinator {
    /// Create a coordinator with the configured sender and templates.
    pub fn new(
        sender: impl Into<String>,
        subject_template: impl Into<String>,
        body_template: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            subject_template: subject_template.into(),
            body_template: body_template.into(),
        }
    }

    /// Deliver the artifact at `artifact` to `recipient`.
    ///
    /// The recipient is validated before anything touches the transport;
    /// subject and body are the configured templates suffixed with
    /// `subject_date`. One attempt per run.
    pub fn deliver<M: MailTransport>(
        &self,
        transport: &M,
        artifact: &Path,
        recipient: &str,
        subject_date: NaiveDate,
    ) -> Result<(), DeliveryError> {
        if !EmailAddress::is_valid(recipient) {
            return Err(DeliveryError::InvalidRecipient(recipient.to_string()));
        }

        let attachment = fs::read(artifact).map_err(|e| DeliveryError::DeliveryFailed {
            details: format!("cannot read report artifact {}: {e}", artifact.display()),
        })?;
        let attachment_name = artifact
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(DEFAULT_ATTACHMENT_NAME)
            .to_string();

        let report = OutgoingReport {
            sender: self.sender.clone(),
            recipient: recipient.to_string(),
            subject: format!("{} {}", self.subject_template, subject_date),
            body: format!("{} {}", self.body_template, subject_date),
            attachment_name,
            attachment,
        };

        transport
            .send(&report)
            .map_err(|e| DeliveryError::DeliveryFailed { details: e.to_string() })?;

        info!(recipient, "report delivered");
        Ok(())
    }

    /// Like [`deliver`](Self::deliver), projected into a [`DeliveryOutcome`].
    pub fn deliver_outcome<M: MailTransport>(
        &self,
        transport: &M,
        artifact: &Path,
        recipient: &str,
        subject_date: NaiveDate,
    ) -> DeliveryOutcome {
        self.deliver(transport, artifact, recipient, subject_date).into()
    }
}
