//! kelpie binary
//!
//! Serves the built-in demo application with the fork-per-connection server,
//! or validates a configuration file.

#[cfg(not(unix))]
compile_error!("kelpie requires a Unix platform with fork(2)");

use clap::{Parser, Subcommand};
use kelpie_cli::{DemoApp, Result};
use kelpie_core::config::load_config_from_toml_path;
use kelpie_core::{Server, ServerConfig};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "kelpie")]
#[command(about = "A fork-per-connection HTTP server")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the server with the built-in demo application
    Serve {
        /// Path to a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Host to bind, overrides the config file
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on, overrides the config file
        #[arg(long)]
        port: Option<u16>,
        /// Zombie collection interval in seconds, overrides the config file
        #[arg(long)]
        cleanup_interval: Option<u64>,
    },
    /// Parse and validate a configuration file
    CheckConfig {
        /// Path to the TOML config file to validate
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    kelpie_core::utils::init_tracing("info")?;

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve {
            config,
            host,
            port,
            cleanup_interval,
        } => serve(config, host, port, cleanup_interval),
        Commands::CheckConfig { file } => check_config(&file),
    }
}

fn serve(
    config: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
    cleanup_interval: Option<u64>,
) -> Result<()> {
    let mut config = match config {
        Some(path) => load_config_from_toml_path(path)?,
        None => ServerConfig::default(),
    };
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(secs) = cleanup_interval {
        config.cleanup_interval_secs = secs;
    }

    // Flag overrides are re-validated by bind
    let server = Server::bind(config, DemoApp)?;
    info!("kelpie serving on {}", server.local_addr()?);
    server.run()?;
    Ok(())
}

fn check_config(file: &PathBuf) -> Result<()> {
    let config = load_config_from_toml_path(file)?;
    println!(
        "{} is valid (binds {})",
        file.display(),
        config.bind_addr()
    );
    Ok(())
}
