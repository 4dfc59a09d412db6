//! Messenger Webhook Server
//!
//! Answers Messenger page messages by echoing them back.

use std::net::{IpAddr, SocketAddr};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use messenger_webhook::messenger::MessengerConfig;
use messenger_webhook::server::{self, DEFAULT_PORT};

/// Messenger Webhook Server
#[derive(Parser, Debug)]
#[command(name = "messenger-webhook")]
#[command(version)]
#[command(about = "Messenger Platform webhook that echoes page messages")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing, RUST_LOG wins over --verbose
    let default_filter = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match MessengerConfig::from_env() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(?config, "Configuration loaded");

    let app = match server::echo_app(config) {
        Ok(app) => app,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build application");
            return ExitCode::FAILURE;
        }
    };

    let addr = SocketAddr::new(args.host, args.port);
    if let Err(e) = server::serve(addr, app).await {
        tracing::error!(error = %e, %addr, "Server failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
