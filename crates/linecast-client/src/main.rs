//! linecast terminal client entry point.

use std::process::ExitCode;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use linecast_client::{ChatClient, ClientEvent, ClientResult};
use linecast_protocol::DEFAULT_PORT;

/// linecast - real-time line broadcast chat
#[derive(Debug, Parser)]
#[command(name = "linecast")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Display name prefixed to every line you send
    name: String,

    /// Server host to connect to
    #[arg(long, default_value = "127.0.0.1", env = "LINECAST_HOST")]
    host: String,

    /// Server port to connect to
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
            .unwrap_or_else(|_| EnvFilter::new(Level::WARN.to_string()))
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

async fn run(cli: Cli) -> ClientResult<()> {
    let (client, mut events) = ChatClient::connect((cli.host.as_str(), cli.port)).await?;
    println!("connected to {}", client.peer_addr());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(ClientEvent::Message(body)) => {
                    println!("{}", String::from_utf8_lossy(&body));
                }
                Some(ClientEvent::Disconnected) | None => {
                    eprintln!("disconnected from server");
                    break;
                }
            },
            line = lines.next_line() => match line? {
                Some(line) => {
                    if line.is_empty() {
                        continue;
                    }
                    if client.send(format!("{}: {}", cli.name, line)).is_err() {
                        eprintln!("disconnected from server");
                        break;
                    }
                }
                None => {
                    // stdin closed; hang up.
                    client.close();
                    break;
                }
            },
        }
    }

    Ok(())
}
