//! Pipeline orchestration
//!
//! Sequences one report run: window → query → retrieval → transformation →
//! artifact → delivery. The run is a linear state machine; every step
//! requires the previous step's success, and the first failure ends the run
//! with a typed reason. Runs are idempotent and hold no state between
//! invocations beyond the on-disk files they overwrite.

pub mod logging;

pub use logging::LoggingConfig;

use crate::connector::{AccessSession, ConnectorError, DataSourceClient};
use crate::delivery::{DeliveryCoordinator, DeliveryError, DeliveryOutcome, MailTransport};
use crate::report::artifact::{write_report, ArtifactError};
use crate::report::period::{compute_window, ReportingWindow};
use crate::report::query::EventQuery;
use crate::report::transform::{transform, TransformError};
use crate::types::ReportConfig;
use chrono::NaiveDate;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// The step a run was in when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    /// Computing the reporting window
    Window,
    /// Building the event query
    Query,
    /// Retrieving event data from the access-control server
    Retrieve,
    /// Transforming records into report rows
    Transform,
    /// Writing the spreadsheet artifact
    Artifact,
    /// Delivering the artifact by mail
    Delivery,
}

impl RunStage {
    /// Human-readable stage name for run-outcome logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStage::Window => "window computation",
            RunStage::Query => "query construction",
            RunStage::Retrieve => "data retrieval",
            RunStage::Transform => "record transformation",
            RunStage::Artifact => "artifact writing",
            RunStage::Delivery => "delivery",
        }
    }
}

/// Terminal failure of a pipeline run.
#[derive(Debug, Error)]
pub enum RunError {
    /// The retrieval protocol failed
    #[error(transparent)]
    Connector(#[from] ConnectorError),

    /// The retrieved batch could not be transformed
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// The artifact could not be written
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// The delivery step failed
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl RunError {
    /// The stage at which the run failed.
    pub fn stage(&self) -> RunStage {
        match self {
            RunError::Connector(_) => RunStage::Retrieve,
            RunError::Transform(_) => RunStage::Transform,
            RunError::Artifact(_) => RunStage::Artifact,
            RunError::Delivery(_) => RunStage::Delivery,
        }
    }

    /// The terminal [`DeliveryOutcome`] of a failed run: the report was not
    /// delivered, and the reason names the failing stage.
    pub fn outcome(&self) -> DeliveryOutcome {
        DeliveryOutcome::failed(format!("{} failed: {self}", self.stage().as_str()))
    }
}

/// Summary of a successfully delivered run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// The reporting window the run covered
    pub window: ReportingWindow,
    /// Rows written to the artifact
    pub rows_written: usize,
    /// Records dropped during transformation for missing attributes
    pub records_skipped: usize,
}

/// One-shot report pipeline over a session and a mail transport.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: ReportConfig,
}

impl Pipeline {
    /// Create a pipeline for the given configuration.
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Execute one full run for `recipient`, reporting on the window
    /// derived from `today`.
    ///
    /// Fail-fast: the first failing step ends the run; nothing is retried
    /// and nothing needs rolling back, since no external state is touched
    /// before the artifact write.
    pub fn run<S: AccessSession, M: MailTransport>(
        &self,
        session: &mut S,
        transport: &M,
        recipient: &str,
        today: NaiveDate,
    ) -> Result<RunSummary, RunError> {
        let window = compute_window(today);
        info!(
            stage = RunStage::Window.as_str(),
            start = %window.start,
            end = %window.end,
            "reporting window computed"
        );

        let query = EventQuery::new(window, &self.config.resource_id, &self.config.event_type_id);
        info!(stage = RunStage::Query.as_str(), "event query built");

        let client =
            DataSourceClient::new(self.config.access_endpoint(), self.config.access_credentials());
        let retrieval = client.retrieve(session, &query)?;
        info!(
            stage = RunStage::Retrieve.as_str(),
            records = retrieval.records.len(),
            "event data retrieved"
        );
        self.dump_raw_response(&retrieval.raw);

        let outcome = transform(&retrieval.records)?;
        if outcome.skipped > 0 {
            warn!(
                stage = RunStage::Transform.as_str(),
                skipped = outcome.skipped,
                "some records were dropped for missing attributes"
            );
        }

        let artifact = Path::new(&self.config.artifact_path);
        write_report(&outcome.rows, artifact)?;

        let coordinator = DeliveryCoordinator::new(
            &self.config.send_from,
            &self.config.mail_subject,
            &self.config.mail_text,
        );
        coordinator.deliver(transport, artifact, recipient, today)?;

        info!(
            rows = outcome.rows.len(),
            skipped = outcome.skipped,
            recipient,
            "report run delivered"
        );
        Ok(RunSummary {
            window,
            rows_written: outcome.rows.len(),
            records_skipped: outcome.skipped,
        })
    }

    /// Dump the verbatim response envelope for diagnosability.
    ///
    /// Diagnostics, not output: a dump failure never fails the run.
    fn dump_raw_response(&self, raw: &str) {
        match fs::write(&self.config.raw_response_path, raw) {
            Ok(()) => info!(path = %self.config.raw_response_path, "raw response envelope saved"),
            Err(e) => warn!(
                path = %self.config.raw_response_path,
                "could not save raw response envelope: {e}"
            ),
        }
    }
}
