//! Access-control session contract
//!
//! The pipeline talks to the access-control server through the
//! [`AccessSession`] trait, so any system exposing an equivalent
//! connect / version-check / fetch / disconnect exchange can be swapped in.
//! Response payloads are carried as an opaque attribute map per event record
//! plus the verbatim response text for diagnostics.

use crate::report::query::EventQuery;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Envelope kind expected in a well-formed event report response.
pub const DOCUMENT_KIND: &str = "regevents";

/// Credentials used to authenticate a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account name on the access-control server
    pub username: String,
    /// Account password
    pub password: String,
}

/// Network endpoint of the access-control server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Host name or address
    pub host: String,
    /// TCP port
    pub port: u16,
}

/// One retrieved event record: an opaque mapping of named attributes.
///
/// Individual records may be incomplete; a missing attribute is a per-record
/// condition handled by the transformer, never a session-level failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawEventRecord(BTreeMap<String, String>);

impl RawEventRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style attribute insertion.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Look up an attribute by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Number of attributes present on this record.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record carries no attributes at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parsed response envelope returned by a fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Envelope kind; [`DOCUMENT_KIND`] for event reports
    pub kind: String,
    /// Retrieved event records, in server order
    #[serde(default)]
    pub records: Vec<RawEventRecord>,
}

/// Result of a successful fetch exchange.
///
/// `raw` is the verbatim response text as received, kept for the diagnostic
/// dump; `envelope` is its parsed form, absent when the payload could not be
/// interpreted.
#[derive(Debug, Clone)]
pub struct FetchReply {
    /// Verbatim response payload
    pub raw: String,
    /// Parsed envelope, if the payload was interpretable
    pub envelope: Option<ResponseEnvelope>,
}

/// Transport-level faults reported by a session implementation.
#[derive(Debug, Error)]
pub enum SessionError {
    /// I/O failure on the underlying transport
    #[error("session transport I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// The peer violated the expected exchange
    #[error("session protocol violation: {0}")]
    Protocol(String),

    /// The server accepted the exchange but rejected the operation
    #[error("server rejected the operation: {0}")]
    Rejected(String),
}

/// A session against the access-control server.
///
/// The pipeline drives implementations strictly sequentially:
/// connect, version check, fetch, disconnect. `disconnect` must be safe to
/// call at any point after construction, including when never connected.
pub trait AccessSession {
    /// Open and authenticate the session.
    fn connect(&mut self, endpoint: &Endpoint, credentials: &Credentials)
        -> Result<(), SessionError>;

    /// Whether the server speaks a protocol version compatible with this
    /// client. Any failure to establish compatibility counts as `false`.
    fn check_version(&mut self) -> bool;

    /// Issue the event query and return the server's reply.
    fn fetch(&mut self, query: &EventQuery) -> Result<FetchReply, SessionError>;

    /// Tear the session down. Idempotent.
    fn disconnect(&mut self);
}
