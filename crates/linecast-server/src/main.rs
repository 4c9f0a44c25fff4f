//! linecast server entry point.

use std::net::SocketAddr;
use std::process::ExitCode;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use linecast_protocol::DEFAULT_PORT;
use linecast_server::{Listener, ServerConfig, ServerError, ServerResult};

/// linecast-server - broadcast every submitted line to every connected client
#[derive(Debug, Parser)]
#[command(name = "linecast-server")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0", env = "LINECAST_HOST")]
    host: String,

    /// Port to listen on
    #[arg(long, short, default_value_t = DEFAULT_PORT, env = "LINECAST_PORT")]
    port: u16,

    /// Enable debug output
    #[arg(long, short = 'v')]
    debug: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.debug {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ServerResult<()> {
    let bind_addr: SocketAddr = format!("{}:{}", cli.host, cli.port)
        .parse()
        .map_err(|e| ServerError::config(format!("invalid listen address: {e}")))?;

    let listener = Listener::bind(&ServerConfig::new(bind_addr)).await?;
    listener
        .run_until_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
}
