//! Access-control connector
//!
//! The session contract the pipeline needs from an access-control system,
//! the retrieval protocol driven over it, and a concrete TCP/JSON session.

pub mod client;
pub mod session;
pub mod tcp;

pub use client::{ConnectorError, DataSourceClient, Retrieval};
pub use session::{
    AccessSession, Credentials, Endpoint, FetchReply, RawEventRecord, ResponseEnvelope,
    SessionError, DOCUMENT_KIND,
};
pub use tcp::{TcpSession, PROTOCOL_VERSION};
