use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use servo_kv::config::{load_config, override_bind_address, BackendKind, ServoConfig};
use servo_kv::lifecycle::{wait_for_signal, Shutdown};
use servo_kv::{observability, Datastore, HttpServer, MemoryStore, PgStore};

/// Per-client key-value item store over HTTP.
#[derive(Parser, Debug)]
#[command(name = "servo-kv", version, about)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServoConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config = override_bind_address(config, bind)?;
    }

    observability::init(&config.observability);

    tracing::info!("servo-kv v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backend = ?config.store.backend,
        public_mode = config.access.public_mode,
        session_ttl_secs = config.session.ttl_secs,
        max_sessions = config.session.max_sessions,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    match config.store.backend {
        BackendKind::Memory => serve(config, MemoryStore::new()).await?,
        BackendKind::Postgres => {
            let store = PgStore::connect(&config.store).await?;
            store.migrate().await?;
            serve(config, store).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn serve<D: Datastore>(config: ServoConfig, store: D) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    HttpServer::new(config, store).run(listener, receiver).await
}
