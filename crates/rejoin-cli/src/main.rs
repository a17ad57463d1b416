//! rejoin binary.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rejoin_core::config::{DEFAULT_MAX_CHUNKS, DEFAULT_MIME};
use rejoin_core::impls::FsBlobStore;
use rejoin_core::{Coordinator, ReassemblyRequest, RejoinConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// rejoin - reassemble chunked blobs into one object
#[derive(Parser, Debug)]
#[command(name = "rejoin")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    store: StoreArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct StoreArgs {
    /// Bucket all chunks are read from and joined objects are written to
    #[arg(long, env = "REJOIN_BUCKET", default_value = "rejoin", global = true)]
    bucket: String,

    /// Root directory holding one subdirectory per bucket
    #[arg(long, env = "REJOIN_DATA_DIR", default_value = "data", global = true)]
    data_dir: PathBuf,

    /// Cap on concurrent chunk reads per request (unbounded when unset)
    #[arg(long, env = "REJOIN_MAX_CONCURRENT_FETCHES", global = true)]
    max_concurrent_fetches: Option<usize>,

    /// Largest chunk count a request may ask for
    #[arg(long, env = "REJOIN_MAX_CHUNKS", default_value_t = DEFAULT_MAX_CHUNKS, global = true)]
    max_chunks: u32,

    /// MIME type recorded in the .meta sidecar
    #[arg(long, env = "REJOIN_MIME", default_value = DEFAULT_MIME, global = true)]
    mime: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve POST /join over HTTP
    Serve {
        #[arg(long, env = "REJOIN_BIND", default_value = "0.0.0.0:8080")]
        bind: String,
    },
    /// Join one set of chunks and print the resulting hash
    Join {
        #[arg(long)]
        hash: String,
        #[arg(long)]
        chunks: i64,
    },
}

impl StoreArgs {
    fn into_config(self) -> RejoinConfig {
        RejoinConfig {
            bucket: self.bucket,
            data_dir: self.data_dir,
            max_concurrent_fetches: self.max_concurrent_fetches,
            max_chunks: self.max_chunks,
            mime: self.mime,
            ..RejoinConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = cli.store.into_config();
    config.validate().context("invalid configuration")?;

    let bucket_dir = config.bucket_dir();
    let store = FsBlobStore::new(&bucket_dir)
        .await
        .with_context(|| format!("failed to open bucket at {}", bucket_dir.display()))?;
    tracing::info!(bucket = %config.bucket, root = %bucket_dir.display(), "store ready");

    match cli.command {
        Command::Serve { bind } => serve(store, config, &bind).await,
        Command::Join { hash, chunks } => join_once(store, config, hash, chunks).await,
    }
}

async fn serve(store: FsBlobStore, config: RejoinConfig, bind: &str) -> Result<()> {
    let coordinator = Arc::new(Coordinator::new(Arc::new(store), config));
    let app = rejoin_cli::router(coordinator);

    let addr: SocketAddr = bind.parse().context("invalid bind address")?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn join_once(store: FsBlobStore, config: RejoinConfig, hash: String, chunks: i64) -> Result<()> {
    let request = ReassemblyRequest::new(hash, chunks, config.max_chunks)?;
    let coordinator = Coordinator::new(Arc::new(store), config);
    let meta = coordinator
        .reassemble(&request)
        .await
        .with_context(|| format!("failed to join {}", request.identifier()))?;
    println!("{}", meta.hash);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
