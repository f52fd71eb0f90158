//! figma-bridge-mcp: MCP server that drives Figma through a companion plugin
//!
//! Tool calls arrive from the MCP client on stdin and are relayed over a local
//! WebSocket to the Figma plugin, which performs them against the open
//! document.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use figma_bridge_mcp::catalog::Catalog;
use figma_bridge_mcp::config::{self, Config};
use figma_bridge_mcp::mcp::server::McpServer;
use figma_bridge_mcp::relay::{PluginListener, RelaySession};

/// MCP server that drives Figma through a companion plugin.
///
/// Exposes Figma document operations as MCP tools and relays each call to
/// the plugin over a local WebSocket.
#[derive(Parser, Debug)]
#[command(name = "figma-bridge-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Port the Figma plugin connects to (overrides FIGMA_WS_PORT and the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Binds the plugin listener, then serves MCP until the client goes away.
async fn run(cfg: Config) -> ExitCode {
    let addr = match cfg.listen_addr() {
        Ok(addr) => addr,
        Err(e) => {
            error!(error = %e, "Invalid listen address");
            return ExitCode::FAILURE;
        }
    };

    let session = Arc::new(RelaySession::new(cfg.request_timeout()));

    let listener = match PluginListener::bind(addr, Arc::clone(&session)).await {
        Ok(listener) => listener,
        Err(e) if e.is_address_in_use() => {
            error!(
                "Port {} is already in use. Another instance may be running.",
                addr.port()
            );
            return ExitCode::FAILURE;
        }
        Err(e) => {
            error!(error = %e, "Failed to start WebSocket server");
            return ExitCode::FAILURE;
        }
    };
    let plugin_listener = tokio::spawn(listener.run());

    let mut server = McpServer::new(Catalog::new(session));
    info!("MCP server ready, waiting for client connection...");

    let result = server.run().await;
    plugin_listener.abort();

    match result {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}

/// Entry point for the figma-bridge-mcp server.
fn main() -> ExitCode {
    let args = Args::parse();

    let config_path = args.config.as_deref();
    let mut cfg = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            if config_path.is_none() {
                if let Some(default_path) = config::default_config_path() {
                    eprintln!("\nConfig searched at: {}", default_path.display());
                }
            }
            return ExitCode::FAILURE;
        }
    };
    if let Some(port) = args.port {
        cfg.bridge.port = port;
    }

    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = cfg.bridge.port,
        "Starting figma-bridge-mcp server"
    );

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(run(cfg))
}
