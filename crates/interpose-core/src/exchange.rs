//! Request/response transport capability supplied by the host.
//!
//! Processors that answer a client directly (see the REST negotiator) talk to
//! the host's transport through [`Exchange`]. The core never implements
//! wire-level HTTP.

use http::StatusCode;
use std::fmt;

/// A response ready to be written by the host transport.
#[derive(Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code.
    pub status: StatusCode,
    /// Value of the `Content-Type` header.
    pub content_type: String,
    /// Additional headers, in order.
    pub headers: Vec<(String, String)>,
    /// Encoded body.
    pub body: Vec<u8>,
}

impl Response {
    /// Creates a response without extra headers.
    pub fn new(status: StatusCode, content_type: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type: content_type.into(),
            headers: Vec::new(),
            body,
        }
    }

    /// Adds a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .finish()
    }
}

/// Error reported by the host transport.
#[derive(Debug, Clone, thiserror::Error)]
#[error("exchange error: {0}")]
pub struct ExchangeError(pub String);

/// Host-side handle to the client request an invocation is serving.
pub trait Exchange: Send + Sync {
    /// The raw `Accept` header of the request, if present.
    fn accept(&self) -> Option<String>;

    /// Returns true once a response has been committed, either by the
    /// service itself or by a processor.
    fn is_committed(&self) -> bool;

    /// Writes the response. Hosts reject a second commit.
    fn respond(&self, response: Response) -> Result<(), ExchangeError>;
}
