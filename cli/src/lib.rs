//! Library support for the kelpie binary
//!
//! Holds the built-in demo application served by `kelpie serve` and the CLI
//! error types.

pub mod error;

pub use error::{CliError, Result};

#[cfg(unix)]
pub use app::DemoApp;

#[cfg(unix)]
mod app {
    use kelpie_core::http::{Request, Response};
    use kelpie_core::server::Handler;

    /// Built-in application served by `kelpie serve`
    ///
    /// Because every request is answered from a freshly forked worker, the
    /// `pid` field of `/status` changes on every call.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct DemoApp;

    impl Handler for DemoApp {
        fn call(&self, request: &Request) -> Response {
            match (request.method.as_str(), request.path.as_str()) {
                ("GET", "/") => Response::text(200, "kelpie is serving\n"),
                ("GET", "/status") => status_response(),
                _ => Response::text(404, "not found\n"),
            }
        }
    }

    fn status_response() -> Response {
        let doc = serde_json::json!({
            "server": "kelpie",
            "version": env!("CARGO_PKG_VERSION"),
            "pid": std::process::id(),
        });
        Response::text(200, doc.to_string()).with_header("Content-Type", "application/json")
    }

}
