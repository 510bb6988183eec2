//! Request head parsing

use super::{ParseError, CRLF};
use std::collections::HashMap;

/// A parsed HTTP request head
///
/// Only the head is represented; any body bytes that arrived with it are
/// ignored by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Request method verb (`GET`, `POST`, ...)
    pub method: String,
    /// Request path, `/` when the target had no path component
    pub path: String,
    /// Raw query string without the leading `?`, if present
    pub query: Option<String>,
    /// HTTP version token from the request line (e.g. `HTTP/1.1`)
    pub version: String,
    /// Host name from the `Host` header, if present
    pub host: Option<String>,
    /// Port from the `Host` header, if one was given
    pub port: Option<u16>,
    /// All header fields, stored with their original names
    pub headers: HashMap<String, String>,
}

impl Request {
    /// Look up a header value by name, case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Parse a request head from the raw bytes read off the socket
///
/// Everything after the first blank line is ignored. Malformed input yields
/// a typed [`ParseError`] rather than a partial request.
pub fn parse_request(data: &str) -> Result<Request, ParseError> {
    let head = match data.split_once("\r\n\r\n") {
        Some((head, _body)) => head,
        None => data,
    };

    let mut lines = head.split(CRLF);
    let request_line = match lines.next() {
        Some(line) if !line.trim().is_empty() => line,
        _ => return Err(ParseError::Empty),
    };

    let mut parts = request_line.split_whitespace();
    let method = parts
        .next()
        .ok_or_else(|| ParseError::RequestLine(request_line.to_string()))?;
    let target = parts
        .next()
        .ok_or_else(|| ParseError::RequestLine(request_line.to_string()))?;
    let version = parts
        .next()
        .ok_or_else(|| ParseError::RequestLine(request_line.to_string()))?;

    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path, Some(query.to_string())),
        None => (target, None),
    };
    let path = if path.is_empty() { "/" } else { path };

    let mut headers = HashMap::new();
    for line in lines {
        if line.is_empty() {
            break;
        }
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| ParseError::Header(line.to_string()))?;
        headers.insert(name.trim().to_string(), value.trim().to_string());
    }

    let (host, port) = match headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("host"))
        .map(|(_, v)| v.as_str())
    {
        Some(value) => match value.split_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| ParseError::HostPort(value.to_string()))?;
                (Some(host.to_string()), Some(port))
            }
            None => (Some(value.to_string()), None),
        },
        None => (None, None),
    };

    Ok(Request {
        method: method.to_string(),
        path: path.to_string(),
        query,
        version: version.to_string(),
        host,
        port,
        headers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_request_line_query_and_headers() {
        let req = parse_request(
            "GET /search?q=dogs&page=2 HTTP/1.1\r\nHost: example.com:8080\r\nAccept: */*\r\n\r\n",
        )
        .expect("should parse");

        assert_eq!(req.method, "GET");
        assert_eq!(req.path, "/search");
        assert_eq!(req.query.as_deref(), Some("q=dogs&page=2"));
        assert_eq!(req.version, "HTTP/1.1");
        assert_eq!(req.host.as_deref(), Some("example.com"));
        assert_eq!(req.port, Some(8080));
        assert_eq!(req.header("accept"), Some("*/*"));
    }

    #[test]
    fn host_without_port() {
        let req = parse_request("GET / HTTP/1.1\r\nHost: example.com\r\n\r\n").expect("parse");
        assert_eq!(req.host.as_deref(), Some("example.com"));
        assert_eq!(req.port, None);
    }

    #[test]
    fn missing_host_header() {
        let req = parse_request("GET / HTTP/1.0\r\n\r\n").expect("parse");
        assert_eq!(req.host, None);
        assert_eq!(req.port, None);
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req =
            parse_request("GET / HTTP/1.1\r\nContent-Type: text/plain\r\n\r\n").expect("parse");
        assert_eq!(req.header("content-type"), Some("text/plain"));
        assert_eq!(req.header("CONTENT-TYPE"), Some("text/plain"));
        assert_eq!(req.header("missing"), None);
    }

    #[test]
    fn body_after_blank_line_is_ignored() {
        let req = parse_request("POST /submit HTTP/1.1\r\nHost: x\r\n\r\nname=value")
            .expect("parse");
        assert_eq!(req.method, "POST");
        assert_eq!(req.path, "/submit");
        assert!(!req.headers.contains_key("name=value"));
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(parse_request(""), Err(ParseError::Empty));
        assert_eq!(parse_request("   "), Err(ParseError::Empty));
    }

    #[test]
    fn rejects_short_request_line() {
        let err = parse_request("garbage\r\n\r\n").unwrap_err();
        assert!(matches!(err, ParseError::RequestLine(_)));

        let err = parse_request("GET /\r\n\r\n").unwrap_err();
        assert!(matches!(err, ParseError::RequestLine(_)));
    }

    #[test]
    fn rejects_header_without_separator() {
        let err = parse_request("GET / HTTP/1.1\r\nnot-a-header\r\n\r\n").unwrap_err();
        assert_eq!(err, ParseError::Header("not-a-header".to_string()));
    }

    #[test]
    fn rejects_bad_host_port() {
        let err = parse_request("GET / HTTP/1.1\r\nHost: example.com:notaport\r\n\r\n").unwrap_err();
        assert_eq!(err, ParseError::HostPort("example.com:notaport".to_string()));
    }
}
