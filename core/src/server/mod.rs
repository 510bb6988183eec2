//! Fork-per-connection HTTP server
//!
//! [`Server`] binds a TCP listener and forks one disposable worker child per
//! accepted connection. The child reads and parses the request, invokes the
//! application [`Handler`], writes the response, and exits; the parent's copy
//! of the connection closes immediately and the accept loop moves on. Exited
//! children are collected in the background by the server's owned
//! [`Reaper`], which runs for exactly as long as the accept loop does.

// Allow unsafe code for this module since SIGPIPE disposition requires a
// nix::sys::signal::signal() call
#![allow(unsafe_code)]

use crate::http::{self, parse_request, Request, Response};
use crate::process;
use crate::reaper::Reaper;
use crate::{config::ServerConfig, CoreError, Result};
use std::io::Read;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const RECV_BUF: usize = 4096;

/// The application seam: one call per connection, in the worker child
///
/// Handlers run in a disposable child process whose outcome is never
/// reported back to the accept loop; a panicking handler produces a 500
/// response and the child still exits cleanly.
pub trait Handler: Send + Sync {
    /// Produce the response for a parsed request
    fn call(&self, request: &Request) -> Response;
}

impl<F> Handler for F
where
    F: Fn(&Request) -> Response + Send + Sync,
{
    fn call(&self, request: &Request) -> Response {
        self(request)
    }
}

/// A bound fork-per-connection server
pub struct Server {
    config: ServerConfig,
    handler: Arc<dyn Handler>,
    listener: TcpListener,
    reaper: Reaper,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("listener", &self.listener)
            .field("reaper", &self.reaper)
            .finish_non_exhaustive()
    }
}

impl Server {
    /// Validate the config, bind the listener, and prepare a reaper
    ///
    /// The reaper is constructed idle; [`run`](Self::run) starts it with the
    /// configured interval.
    pub fn bind<H>(config: ServerConfig, handler: H) -> Result<Self>
    where
        H: Handler + 'static,
    {
        config.validate()?;
        let listener = TcpListener::bind(config.bind_addr()).map_err(|e| {
            CoreError::ServerError(format!("failed to bind {}: {}", config.bind_addr(), e))
        })?;
        Ok(Self {
            config,
            handler: Arc::new(handler),
            listener,
            reaper: Reaper::new(),
        })
    }

    /// Address the listener is actually bound to
    ///
    /// Useful when the config asked for port 0 and the OS picked one.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// The configuration this server was built from
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The reaper owned by this server
    pub fn reaper(&self) -> &Reaper {
        &self.reaper
    }

    /// Serve connections until the accept loop fails permanently
    ///
    /// Starts the background reaper first and stops it on the way out,
    /// whether the loop ended in an error or not.
    pub fn run(&self) -> Result<()> {
        ignore_sigpipe()?;
        self.reaper.keep_clean(self.config.cleanup_interval_secs)?;
        info!(
            "listening on {} (one worker child per connection)",
            self.local_addr()?
        );

        let result = self.accept_loop();
        self.reaper.stop_cleanup();
        result
    }

    fn accept_loop(&self) -> Result<()> {
        let mut failures: u32 = 0;
        loop {
            let stream = match self.listener.accept() {
                Ok((stream, peer)) => {
                    failures = 0;
                    debug!("accepted connection from {}", peer);
                    stream
                }
                Err(e) => {
                    failures += 1;
                    warn!(
                        "accept failed ({}/{}): {}",
                        failures, self.config.max_accept_retries, e
                    );
                    if failures >= self.config.max_accept_retries {
                        return Err(CoreError::ServerError(format!(
                            "accept failed {} times in a row: {}",
                            failures, e
                        )));
                    }
                    continue;
                }
            };

            let handler = Arc::clone(&self.handler);
            let read_timeout = Duration::from_secs(self.config.read_timeout_secs);
            process::fork_and_run(move || handle_connection(stream, handler, read_timeout))?;
            // The parent's copy of the connection closes when the unused
            // closure is dropped here; the child owns it from now on.
        }
    }
}

/// Runs inside the worker child: read, parse, handle, respond
fn handle_connection(mut stream: TcpStream, handler: Arc<dyn Handler>, read_timeout: Duration) {
    let data = match read_request_head(&mut stream, read_timeout) {
        Ok(Some(data)) => data,
        Ok(None) => return,
        Err(e) => {
            debug!("failed to read request: {}", e);
            return;
        }
    };

    let mut response = match parse_request(&data) {
        Ok(request) => match catch_unwind(AssertUnwindSafe(|| handler.call(&request))) {
            Ok(response) => response,
            Err(_) => {
                warn!("handler panicked for {} {}", request.method, request.path);
                Response::text(500, "internal server error\n")
            }
        },
        Err(e) => {
            debug!("rejected malformed request: {}", e);
            Response::text(400, "bad request\n")
        }
    };

    response.set_header("Connection", "close");
    response.set_header("Server", http::SERVER_TOKEN);

    if let Err(e) = response.write_to(&mut stream) {
        debug!("failed to write response: {}", e);
    }
    let _ = stream.shutdown(Shutdown::Both);
}

/// Read until the end of the request head, a short read, EOF, or the timeout
///
/// Request bodies are not consumed; whatever arrived with the head is handed
/// to the parser, which ignores everything past the blank line. Returns
/// `None` when the peer sent nothing at all.
fn read_request_head(stream: &mut TcpStream, timeout: Duration) -> std::io::Result<Option<String>> {
    stream.set_read_timeout(Some(timeout))?;
    let mut data = Vec::new();
    let mut buf = [0u8; RECV_BUF];
    loop {
        match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                data.extend_from_slice(&buf[..n]);
                if n < RECV_BUF || head_complete(&data) {
                    break;
                }
            }
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                // Timed out waiting for more data; work with what arrived
                break;
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    if data.is_empty() {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&data).into_owned()))
}

fn head_complete(data: &[u8]) -> bool {
    data.windows(4).any(|window| window == b"\r\n\r\n")
}

/// Keep a vanished peer from killing the process mid-write
///
/// With SIGPIPE ignored, writes to a reset connection surface as `EPIPE`
/// in the worker child instead of terminating it by signal.
fn ignore_sigpipe() -> Result<()> {
    use nix::sys::signal::{signal, SigHandler, Signal};
    // Safety: installing SigIgn for SIGPIPE does not race with any handler
    // logic; there is no custom handler to corrupt.
    unsafe { signal(Signal::SIGPIPE, SigHandler::SigIgn) }
        .map(|_| ())
        .map_err(|e| CoreError::ServerError(format!("failed to ignore SIGPIPE: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_complete_detects_blank_line() {
        assert!(head_complete(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n"));
        assert!(head_complete(b"GET / HTTP/1.1\r\n\r\nbody"));
        assert!(!head_complete(b"GET / HTTP/1.1\r\nHost: x\r\n"));
        assert!(!head_complete(b""));
    }

    #[test]
    fn closures_are_handlers() {
        fn respond(handler: &dyn Handler, request: &Request) -> Response {
            handler.call(request)
        }

        let handler = |request: &Request| Response::text(200, request.path.clone());
        let request = parse_request("GET /ping HTTP/1.1\r\n\r\n").expect("parse");
        let response = respond(&handler, &request);
        assert_eq!(response.status, 200);
        assert_eq!(response.body(), b"/ping");
    }
}
