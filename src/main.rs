//! rtmp-edge binary: load configuration, initialize tracing, serve.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rtmp_edge::config::load_config;
use rtmp_edge::{HandlerFactory, Server, ServerConfig};

#[derive(Debug, Parser)]
#[command(name = "rtmp-edge", about = "RTMP ingest front-end")]
struct Args {
    /// Path to the TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rtmp_edge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };

    let factory = HandlerFactory::with_builtins();
    let server = Server::new(config);

    tracing::info!(
        port = server.config().port,
        locations = server.config().locations.len(),
        "rtmp-edge starting"
    );

    server.listen_and_serve(&factory).await?;

    Ok(())
}
