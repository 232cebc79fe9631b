use anyhow::{Context, Result};
use clap::Parser;
use gsheet_cache::SheetCache;
use gsheet_core::{MemoryTransport, StoreConfig};
use gsheet_http::{EnvToken, HttpTransport};
use gsheet_server::{create_router, AppState};
use gsheet_store::SheetRecordStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// HTTP server for spreadsheet-backed records
#[derive(Parser)]
#[command(name = "gsheet-server", version)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:3000")]
    addr: String,

    /// Configuration file (defaults to <config dir>/gsheet/config.yaml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Serve an in-memory sample spreadsheet instead of the Sheets API
    #[arg(long)]
    memory: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let args = Args::parse();
    let state = if args.memory {
        let store = SheetRecordStore::new(Arc::new(MemoryTransport::sample()));
        AppState::new(SheetCache::new(store))
    } else {
        let config =
            StoreConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
        let credentials = Arc::new(EnvToken::new(config.token_env.clone()));
        let transport = HttpTransport::new(&config, credentials.clone())?;
        let store = SheetRecordStore::new(Arc::new(transport));
        AppState::new(SheetCache::new(store)).with_credentials(credentials)
    };

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(&args.addr)
        .await
        .with_context(|| format!("Failed to bind {}", args.addr))?;
    tracing::info!("gsheet-server listening on {}", args.addr);
    axum::serve(listener, app).await?;

    Ok(())
}
