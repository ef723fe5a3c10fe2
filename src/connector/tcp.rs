//! TCP session implementation
//!
//! A concrete [`AccessSession`] speaking newline-delimited JSON frames over
//! a plain TCP stream: an authenticated hello, a protocol-version exchange,
//! then the event fetch. Any server exposing this exchange (or a bridge in
//! front of a vendor SDK) can serve the pipeline; other transports plug in
//! through the trait.

use super::session::{
    AccessSession, Credentials, Endpoint, FetchReply, ResponseEnvelope, SessionError,
    DOCUMENT_KIND,
};
use crate::report::query::EventQuery;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use tracing::{debug, warn};

/// Protocol version this client speaks. The server must report the same
/// version during the version exchange.
pub const PROTOCOL_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
struct HelloFrame<'a> {
    op: &'static str,
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct VersionFrame {
    op: &'static str,
    version: u32,
}

#[derive(Debug, Serialize)]
struct FetchFrame<'a> {
    op: &'static str,
    kind: &'static str,
    beginperiod: String,
    endperiod: String,
    beginperiodtime: &'a str,
    endperiodtime: &'a str,
    id_resource: &'a str,
    id_event: &'a str,
}

#[derive(Debug, Deserialize)]
struct StatusReply {
    status: i32,
    #[serde(default)]
    detail: String,
    #[serde(default)]
    version: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct FetchStatusReply {
    status: i32,
    #[serde(default)]
    detail: String,
    #[serde(default)]
    document: Option<ResponseEnvelope>,
}

/// Newline-delimited-JSON session over `TcpStream`.
#[derive(Debug, Default)]
pub struct TcpSession {
    stream: Option<BufReader<TcpStream>>,
}

impl TcpSession {
    /// Create a session in the disconnected state.
    pub fn new() -> Self {
        Self::default()
    }

    fn send_frame<T: Serialize>(&mut self, frame: &T) -> Result<(), SessionError> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| SessionError::Protocol("session is not connected".to_string()))?;
        let mut line = serde_json::to_string(frame)
            .map_err(|e| SessionError::Protocol(e.to_string()))?;
        line.push('\n');
        stream.get_mut().write_all(line.as_bytes())?;
        stream.get_mut().flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<String, SessionError> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| SessionError::Protocol("session is not connected".to_string()))?;
        let mut line = String::new();
        let read = stream.read_line(&mut line)?;
        if read == 0 {
            return Err(SessionError::Protocol(
                "server closed the connection mid-exchange".to_string(),
            ));
        }
        Ok(line.trim_end().to_string())
    }
}

impl AccessSession for TcpSession {
    fn connect(
        &mut self,
        endpoint: &Endpoint,
        credentials: &Credentials,
    ) -> Result<(), SessionError> {
        let stream = TcpStream::connect((endpoint.host.as_str(), endpoint.port))?;
        self.stream = Some(BufReader::new(stream));

        self.send_frame(&HelloFrame {
            op: "hello",
            username: &credentials.username,
            password: &credentials.password,
        })?;
        let line = self.read_line()?;
        let reply: StatusReply =
            serde_json::from_str(&line).map_err(|e| SessionError::Protocol(e.to_string()))?;
        if reply.status != 0 {
            self.disconnect();
            return Err(SessionError::Rejected(reply.detail));
        }
        debug!(host = %endpoint.host, port = endpoint.port, "session established");
        Ok(())
    }

    fn check_version(&mut self) -> bool {
        let exchange = (|| -> Result<StatusReply, SessionError> {
            self.send_frame(&VersionFrame { op: "version", version: PROTOCOL_VERSION })?;
            let line = self.read_line()?;
            serde_json::from_str(&line).map_err(|e| SessionError::Protocol(e.to_string()))
        })();

        match exchange {
            Ok(reply) => reply.status == 0 && reply.version == Some(PROTOCOL_VERSION),
            Err(e) => {
                warn!("version exchange failed: {e}");
                false
            }
        }
    }

    fn fetch(&mut self, query: &EventQuery) -> Result<FetchReply, SessionError> {
        self.send_frame(&FetchFrame {
            op: "fetch",
            kind: DOCUMENT_KIND,
            beginperiod: query.begin_period(),
            endperiod: query.end_period(),
            beginperiodtime: query.start_time(),
            endperiodtime: query.end_time(),
            id_resource: query.resource_id(),
            id_event: query.event_type_id(),
        })?;
        let raw = self.read_line()?;

        let reply: FetchStatusReply =
            serde_json::from_str(&raw).map_err(|e| SessionError::Protocol(e.to_string()))?;
        if reply.status != 0 {
            return Err(SessionError::Rejected(reply.detail));
        }
        Ok(FetchReply { raw, envelope: reply.document })
    }

    fn disconnect(&mut self) {
        if self.stream.take().is_some() {
            debug!("session closed");
        }
    }
}
