//! Response assembly and serialization

use super::{status, CRLF};
use std::io::{self, Write};

/// An HTTP response ready to be written to a connection
///
/// Responses are always written as HTTP/1.1 with the connection closed
/// afterwards; the server stamps the `Connection` and `Server` headers
/// before writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code of the response
    pub status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Response {
    /// Create an empty response with the given status code
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Create a plain-text response
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        let mut response = Self::new(status);
        response.set_header("Content-Type", "text/plain; charset=utf-8");
        response.body = body.into().into_bytes();
        response
    }

    /// Set a header, replacing any existing value with the same name
    pub fn set_header(&mut self, name: &str, value: &str) {
        if let Some(entry) = self
            .headers
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            entry.1 = value.to_string();
        } else {
            self.headers.push((name.to_string(), value.to_string()));
        }
    }

    /// Builder-style variant of [`set_header`](Self::set_header)
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.set_header(name, value);
        self
    }

    /// Replace the response body
    pub fn set_body(&mut self, body: Vec<u8>) {
        self.body = body;
    }

    /// The response body bytes
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Look up a header value by name, case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Serialize the status line, headers, and body to `writer`
    ///
    /// A `Content-Length` header is added when the body is non-empty and
    /// none was set explicitly.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write!(
            writer,
            "HTTP/1.1 {} {}{}",
            self.status,
            status::reason_phrase(self.status),
            CRLF
        )?;
        for (name, value) in &self.headers {
            write!(writer, "{}: {}{}", name, value, CRLF)?;
        }
        if !self.body.is_empty() && self.header("content-length").is_none() {
            write!(writer, "Content-Length: {}{}", self.body.len(), CRLF)?;
        }
        writer.write_all(CRLF.as_bytes())?;
        writer.write_all(&self.body)?;
        writer.flush()
    }
}
