//! Badge Report
//!
//! A monthly access-control event report pipeline: queries an external
//! access-control server for the events of the reporting month, writes the
//! result into a spreadsheet artifact and mails it to a recipient.
//!
//! # Overview
//!
//! Each invocation is a fresh, idempotent run. Data flows strictly forward:
//! date → reporting window → event query → raw records → report rows →
//! artifact → delivery outcome. Every step is fail-fast; the only locally
//! recovered condition is an individual malformed event record, which is
//! skipped and counted rather than aborting the batch.
//!
//! ## Module Organization
//!
//! - [`types`]: configuration (CLI, JSON file, environment)
//! - [`report`]: window computation, query construction, record
//!   transformation and the spreadsheet artifact writer
//! - [`connector`]: the access-control session contract, the retrieval
//!   protocol and a concrete TCP/JSON session
//! - [`delivery`]: recipient validation, mail transport seam and the SMTP
//!   implementation
//! - [`pipeline`]: run orchestration and logging setup
//!
//! ## Quick Start
//!
//! ```no_run
//! use badge_report::connector::TcpSession;
//! use badge_report::delivery::SmtpMailer;
//! use badge_report::pipeline::Pipeline;
//! use badge_report::types::ReportConfig;
//!
//! let config = ReportConfig::default();
//! let mailer = SmtpMailer::new(
//!     config.smtp_host.clone(),
//!     config.smtp_port,
//!     config.smtp_username.clone(),
//!     config.smtp_password.clone(),
//! );
//! let mut session = TcpSession::new();
//! let today = chrono::Local::now().date_naive();
//!
//! let summary = Pipeline::new(config)
//!     .run(&mut session, &mailer, "operator@example.com", today)?;
//! println!("delivered {} rows", summary.rows_written);
//! # Ok::<(), badge_report::pipeline::RunError>(())
//! ```
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]

pub mod connector;
pub mod delivery;
pub mod pipeline;
pub mod report;
pub mod types;

pub use connector::{
    AccessSession, ConnectorError, Credentials, DataSourceClient, Endpoint, RawEventRecord,
    ResponseEnvelope, Retrieval, SessionError, TcpSession,
};
pub use delivery::{
    DeliveryCoordinator, DeliveryError, DeliveryOutcome, MailTransport, OutgoingReport,
    SmtpMailer, TransportError,
};
pub use pipeline::{LoggingConfig, Pipeline, RunError, RunStage, RunSummary};
pub use report::{
    compute_window, transform, ArtifactError, EventQuery, ReportRow, ReportingWindow,
    TransformError, TransformOutcome,
};
pub use types::{CliArgs, ConfigError, ConfigValidationError, ReportConfig};
