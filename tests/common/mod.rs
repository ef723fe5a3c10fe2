//! Shared test doubles for the integration tests

#![allow(dead_code)]

use badge_report::connector::{
    AccessSession, Credentials, Endpoint, FetchReply, RawEventRecord, ResponseEnvelope,
    SessionError, DOCUMENT_KIND,
};
use badge_report::delivery::{MailTransport, OutgoingReport, TransportError};
use badge_report::report::query::EventQuery;
use badge_report::report::transform::{ATTR_EVENT_DATE, ATTR_FULL_NAME, ATTR_SUBDIVISION};
use std::cell::RefCell;

/// Scripted access session that records every call made against it.
pub struct ScriptedSession {
    pub connect_ok: bool,
    pub version_ok: bool,
    pub fetch_result: Option<FetchReply>,
    pub calls: Vec<&'static str>,
}

impl ScriptedSession {
    /// A session that succeeds with the given records.
    pub fn with_records(records: Vec<RawEventRecord>) -> Self {
        let envelope = ResponseEnvelope { kind: DOCUMENT_KIND.to_string(), records };
        let raw = serde_json::to_string(&envelope).unwrap();
        Self {
            connect_ok: true,
            version_ok: true,
            fetch_result: Some(FetchReply { raw, envelope: Some(envelope) }),
            calls: Vec::new(),
        }
    }

    /// A session whose fetch step fails.
    pub fn failing_fetch() -> Self {
        Self { connect_ok: true, version_ok: true, fetch_result: None, calls: Vec::new() }
    }

    pub fn disconnect_count(&self) -> usize {
        self.calls.iter().filter(|c| **c == "disconnect").count()
    }
}

impl AccessSession for ScriptedSession {
    fn connect(
        &mut self,
        _endpoint: &Endpoint,
        _credentials: &Credentials,
    ) -> Result<(), SessionError> {
        self.calls.push("connect");
        if self.connect_ok {
            Ok(())
        } else {
            Err(SessionError::Rejected("bad credentials".to_string()))
        }
    }

    fn check_version(&mut self) -> bool {
        self.calls.push("check_version");
        self.version_ok
    }

    fn fetch(&mut self, _query: &EventQuery) -> Result<FetchReply, SessionError> {
        self.calls.push("fetch");
        self.fetch_result
            .take()
            .ok_or_else(|| SessionError::Rejected("fetch refused".to_string()))
    }

    fn disconnect(&mut self) {
        self.calls.push("disconnect");
    }
}

/// Mail transport that records every message handed to it.
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: RefCell<Vec<OutgoingReport>>,
    pub fail_with: Option<String>,
}

impl MailTransport for RecordingTransport {
    fn send(&self, report: &OutgoingReport) -> Result<(), TransportError> {
        if let Some(reason) = &self.fail_with {
            return Err(TransportError::Transport(reason.clone()));
        }
        self.sent.borrow_mut().push(report.clone());
        Ok(())
    }
}

/// An event record carrying all three required attributes.
pub fn complete_record(name: &str, date: &str, subdivision: &str) -> RawEventRecord {
    RawEventRecord::new()
        .with_attr(ATTR_FULL_NAME, name)
        .with_attr(ATTR_EVENT_DATE, date)
        .with_attr(ATTR_SUBDIVISION, subdivision)
}
