//! mikro-server CLI
//!
//! Serves the demo application over plain HTTP/1.1.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use mikro_router::RouterConfig;
use mikro_server::{app, load_config, serve};

/// Priority-ordered routing demo server.
#[derive(Parser)]
#[command(name = "mikro-server")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to listen on.
    #[arg(short, long, env = "MIKRO_BIND", default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// JSON file with router settings.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path prefix the application is mounted under.
    #[arg(long, env = "MIKRO_BASE_PATH")]
    base_path: Option<String>,

    /// Host used in absolute URLs when requests carry none.
    #[arg(long, env = "MIKRO_HOST")]
    host: Option<String>,

    /// Extra HTTP methods routes may be registered for.
    #[arg(long = "method", value_name = "METHOD")]
    methods: Vec<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };
    if let Some(base_path) = cli.base_path {
        config.base_path = base_path;
    }
    if let Some(host) = cli.host {
        config.host = host;
    }
    config.methods.extend(cli.methods);

    info!(base_path = %config.base_path, methods = ?config.methods, "building routes");
    let router = app::demo_router(config)?;
    for route in router.routes() {
        info!(
            pattern = route.pattern(),
            name = route.name(),
            priority = ?route.priority(),
            "route"
        );
    }

    let listener = TcpListener::bind(cli.bind).await?;
    serve(listener, Arc::new(router)).await?;

    Ok(())
}
