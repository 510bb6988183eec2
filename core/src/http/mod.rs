//! Minimal HTTP/1.1 request parsing and response writing
//!
//! Covers exactly the subset a fork-per-connection server needs: parsing a
//! request head into method, target, and headers, and serializing a
//! `Connection: close` response. Request bodies are not consumed and chunked
//! transfer encoding is not supported.

pub mod error;
mod request;
mod response;
pub mod status;

pub use error::ParseError;
pub use request::{parse_request, Request};
pub use response::Response;

/// CRLF line terminator used throughout the wire format
pub const CRLF: &str = "\r\n";

/// Token reported in the `Server:` response header
pub const SERVER_TOKEN: &str = concat!("kelpie/", env!("CARGO_PKG_VERSION"));
