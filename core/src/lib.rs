//! Core functionality for the kelpie project
//!
//! kelpie serves HTTP by forking one disposable worker child per accepted
//! connection and collecting the exited children with a background reaper.
//! This crate contains the process primitives, the reaper, the minimal HTTP
//! layer, the server itself, and shared configuration and error types; the
//! `kelpie` binary lives in the sibling CLI crate.
//!
//! The process, reaper, and server modules exist only on Unix; there is no
//! degraded fallback on platforms without `fork(2)`.

pub mod config;
pub mod error;
pub mod http;
#[cfg(unix)]
pub mod process;
#[cfg(unix)]
pub mod reaper;
#[cfg(unix)]
pub mod server;

pub use config::{load_config_from_toml_path, load_config_from_toml_str, ServerConfig};
pub use error::{CoreError, Result};
#[cfg(unix)]
pub use reaper::Reaper;
#[cfg(unix)]
pub use server::{Handler, Server};

/// Core utilities and helper functions
pub mod utils {
    use tracing::info;

    /// Initialize tracing for the application
    ///
    /// `RUST_LOG` takes precedence over the provided default level.
    pub fn init_tracing(level: &str) -> crate::Result<()> {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        fmt()
            .with_env_filter(filter)
            .try_init()
            .map_err(|e| crate::CoreError::InitializationError(e.to_string()))?;

        info!("tracing initialized with level: {}", level);
        Ok(())
    }
}
