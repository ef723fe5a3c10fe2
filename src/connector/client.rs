//! Data source retrieval protocol
//!
//! Drives one connect / version-check / fetch / disconnect exchange against
//! an [`AccessSession`]. Each step can fail independently and short-circuits
//! the remaining steps; once the session has connected, teardown is
//! guaranteed on every exit path by a scoped guard. No retries are performed
//! here: retry policy, if ever wanted, belongs to the caller.

use super::session::{
    AccessSession, Credentials, Endpoint, RawEventRecord, DOCUMENT_KIND,
};
use crate::report::query::EventQuery;
use thiserror::Error;
use tracing::{debug, info};

/// Failures of the retrieval protocol, one per protocol step.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Step 1: the session could not be opened or authenticated
    #[error("failed to connect to the access-control server: {details}")]
    ConnectFailed {
        /// Underlying transport/authentication failure
        details: String,
    },

    /// Step 2: client and server protocol versions are incompatible.
    /// Fatal for the run; no negotiation or fallback is attempted.
    #[error("client and server protocol versions do not match")]
    VersionMismatch,

    /// Step 3: the server failed or rejected the event fetch
    #[error("failed to fetch event data: {details}")]
    FetchFailed {
        /// Underlying fetch failure
        details: String,
    },

    /// Step 5: the response lacks the expected envelope
    #[error("response is missing the expected event report envelope")]
    EmptyResponse,
}

/// A successful retrieval: the verbatim response text plus the parsed
/// event records, in server order.
#[derive(Debug, Clone)]
pub struct Retrieval {
    /// Verbatim response payload, kept for the diagnostic dump
    pub raw: String,
    /// Parsed event records
    pub records: Vec<RawEventRecord>,
}

/// Client for one retrieval exchange against the access-control server.
#[derive(Debug, Clone)]
pub struct DataSourceClient {
    endpoint: Endpoint,
    credentials: Credentials,
}

impl DataSourceClient {
    /// Create a client for the given server endpoint and account.
    pub fn new(endpoint: Endpoint, credentials: Credentials) -> Self {
        Self { endpoint, credentials }
    }

    /// Run the full retrieval protocol for `query` over `session`.
    ///
    /// After a successful connect the session is disconnected on every
    /// return path, success or failure, before the payload is inspected.
    pub fn retrieve<S: AccessSession>(
        &self,
        session: &mut S,
        query: &EventQuery,
    ) -> Result<Retrieval, ConnectorError> {
        debug!(host = %self.endpoint.host, port = self.endpoint.port, "connecting");
        session
            .connect(&self.endpoint, &self.credentials)
            .map_err(|e| ConnectorError::ConnectFailed { details: e.to_string() })?;

        // Connected: the guard tears the session down on every path below.
        let connected = ConnectedSession(session);

        if !connected.0.check_version() {
            return Err(ConnectorError::VersionMismatch);
        }

        let reply = connected
            .0
            .fetch(query)
            .map_err(|e| ConnectorError::FetchFailed { details: e.to_string() })?;

        // The exchange is over; release the connection before validating
        // the payload so a malformed envelope cannot leak the session.
        drop(connected);

        let envelope = reply
            .envelope
            .filter(|envelope| envelope.kind == DOCUMENT_KIND)
            .ok_or(ConnectorError::EmptyResponse)?;

        info!(records = envelope.records.len(), "event data retrieved");
        Ok(Retrieval { raw: reply.raw, records: envelope.records })
    }
}

/// Scoped ownership of a connected session; disconnects on drop.
struct ConnectedSession<'a, S: AccessSession>(&'a mut S);

impl<S: AccessSession> Drop for ConnectedSession<'_, S> {
    fn drop(&mut self) {
        self.0.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::session::{FetchReply, ResponseEnvelope, SessionError};
    use crate::report::period::compute_window;
    use chrono::NaiveDate;

    /// Scripted session that records the order of calls made against it.
    struct ScriptedSession {
        connect_ok: bool,
        version_ok: bool,
        fetch_result: Option<FetchReply>,
        calls: Vec<&'static str>,
    }

    impl ScriptedSession {
        fn new() -> Self {
            Self { connect_ok: true, version_ok: true, fetch_result: None, calls: Vec::new() }
        }

        fn disconnect_count(&self) -> usize {
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

    fn client() -> DataSourceClient {
        DataSourceClient::new(
            Endpoint { host: "localhost".to_string(), port: 4321 },
            Credentials { username: "svc".to_string(), password: "secret".to_string() },
        )
    }

    fn query() -> EventQuery {
        let window = compute_window(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        EventQuery::new(window, "12", "32")
    }

    #[test]
    fn test_connect_failure_attempts_nothing_further() {
        let mut session = ScriptedSession::new();
        session.connect_ok = false;

        let err = client().retrieve(&mut session, &query()).unwrap_err();
        assert!(matches!(err, ConnectorError::ConnectFailed { .. }));
        assert_eq!(session.calls, vec!["connect"]);
    }

    #[test]
    fn test_version_mismatch_disconnects_exactly_once() {
        let mut session = ScriptedSession::new();
        session.version_ok = false;

        let err = client().retrieve(&mut session, &query()).unwrap_err();
        assert!(matches!(err, ConnectorError::VersionMismatch));
        assert_eq!(session.calls, vec!["connect", "check_version", "disconnect"]);
        assert_eq!(session.disconnect_count(), 1);
    }

    #[test]
    fn test_fetch_failure_disconnects_exactly_once() {
        let mut session = ScriptedSession::new();
        session.fetch_result = None;

        let err = client().retrieve(&mut session, &query()).unwrap_err();
        assert!(matches!(err, ConnectorError::FetchFailed { .. }));
        assert_eq!(session.disconnect_count(), 1);
    }

    #[test]
    fn test_malformed_envelope_reported_after_teardown() {
        let mut session = ScriptedSession::new();
        session.fetch_result =
            Some(FetchReply { raw: "not an envelope".to_string(), envelope: None });

        let err = client().retrieve(&mut session, &query()).unwrap_err();
        assert!(matches!(err, ConnectorError::EmptyResponse));
        assert_eq!(session.disconnect_count(), 1);
    }

    #[test]
    fn test_unexpected_envelope_kind_is_empty_response() {
        let mut session = ScriptedSession::new();
        session.fetch_result = Some(FetchReply {
            raw: r#"{"kind":"something-else"}"#.to_string(),
            envelope: Some(ResponseEnvelope {
                kind: "something-else".to_string(),
                records: Vec::new(),
            }),
        });

        let err = client().retrieve(&mut session, &query()).unwrap_err();
        assert!(matches!(err, ConnectorError::EmptyResponse));
    }

    #[test]
    fn test_successful_retrieval_returns_records_in_order() {
        let records = vec![
            RawEventRecord::new().with_attr("f_fio", "A"),
            RawEventRecord::new().with_attr("f_fio", "B"),
        ];
        let mut session = ScriptedSession::new();
        session.fetch_result = Some(FetchReply {
            raw: "payload".to_string(),
            envelope: Some(ResponseEnvelope {
                kind: DOCUMENT_KIND.to_string(),
                records: records.clone(),
            }),
        });

        let retrieval = client().retrieve(&mut session, &query()).unwrap();
        assert_eq!(retrieval.raw, "payload");
        assert_eq!(retrieval.records, records);
        assert_eq!(
            session.calls,
            vec!["connect", "check_version", "fetch", "disconnect"]
        );
    }
}
