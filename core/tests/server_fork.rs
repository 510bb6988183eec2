//! End-to-end tests for the fork-per-connection server
//!
//! Each test binds a server on an ephemeral port, drives it over a real TCP
//! connection, and reads the response produced by the forked worker child.

#![cfg(unix)]

use kelpie_core::http::{Request, Response};
use kelpie_core::server::{Handler, Server};
use kelpie_core::ServerConfig;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::time::Duration;

fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        read_timeout_secs: 2,
        cleanup_interval_secs: 1,
        max_accept_retries: 10,
    }
}

fn start(handler: impl Handler + 'static) -> (Arc<Server>, SocketAddr) {
    let server = Arc::new(Server::bind(test_config(), handler).expect("bind"));
    let addr = server.local_addr().expect("local addr");
    let runner = Arc::clone(&server);
    std::thread::spawn(move || {
        let _ = runner.run();
    });
    (server, addr)
}

fn roundtrip(addr: SocketAddr, request: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).expect("connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("set timeout");
    stream.write_all(request).expect("send request");
    let mut response = String::new();
    stream.read_to_string(&mut response).expect("read response");
    response
}

#[test]
fn forked_worker_answers_request() {
    let (server, addr) = start(|request: &Request| {
        Response::text(
            200,
            format!(
                "method={} path={} query={}",
                request.method,
                request.path,
                request.query.clone().unwrap_or_default()
            ),
        )
    });

    let response = roundtrip(addr, b"GET /hello?x=1 HTTP/1.1\r\nHost: 127.0.0.1\r\n\r\n");

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "{response}");
    assert!(response.contains("Connection: close\r\n"));
    assert!(response.contains("Server: kelpie/"));
    assert!(response.contains("method=GET path=/hello query=x=1"));

    // The reaper runs for as long as the accept loop does
    assert!(server.reaper().is_running());
}

#[test]
fn malformed_request_gets_400() {
    let (_server, addr) = start(|_request: &Request| Response::text(200, "unreachable"));

    let response = roundtrip(addr, b"garbage\r\n\r\n");
    assert!(
        response.starts_with("HTTP/1.1 400 Bad Request\r\n"),
        "{response}"
    );
}

#[test]
fn panicking_handler_gets_500() {
    let (_server, addr) = start(|_request: &Request| -> Response { panic!("handler failure") });

    let response = roundtrip(addr, b"GET /boom HTTP/1.1\r\nHost: 127.0.0.1\r\n\r\n");
    assert!(
        response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"),
        "{response}"
    );
}

#[test]
fn accept_loop_survives_many_requests() {
    let (_server, addr) = start(|request: &Request| Response::text(200, request.path.clone()));

    for i in 0..5 {
        let request = format!("GET /req/{i} HTTP/1.1\r\nHost: 127.0.0.1\r\n\r\n");
        let response = roundtrip(addr, request.as_bytes());
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "{response}");
        assert!(response.ends_with(&format!("/req/{i}")), "{response}");
    }
}

#[test]
fn bind_rejects_invalid_config() {
    let config = ServerConfig {
        cleanup_interval_secs: 0,
        ..test_config()
    };
    let err = Server::bind(config, |_request: &Request| Response::new(204)).unwrap_err();
    assert!(err
        .to_string()
        .contains("cleanupIntervalSecs: must be > 0"));
}
