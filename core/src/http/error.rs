//! Error types for request parsing

use thiserror::Error;

/// Errors produced while parsing a request head
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The input contained no request line
    #[error("empty request")]
    Empty,

    /// The request line did not have the `METHOD target HTTP/x.y` shape
    #[error("malformed request line: {0:?}")]
    RequestLine(String),

    /// A header line had no `name: value` separator
    #[error("malformed header line: {0:?}")]
    Header(String),

    /// The `Host` header carried a port that is not a valid u16
    #[error("invalid port in Host header: {0:?}")]
    HostPort(String),
}
