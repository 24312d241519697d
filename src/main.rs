//! Made Timber quote service

use std::sync::Arc;

use anyhow::Result;
use made_timber_quote::api::{self, AppState};
use made_timber_quote::storage::{FileStorageProvider, MemoryStorageProvider, StorageProvider};
use made_timber_quote::{AppConfig, StaticCatalog, StorageBackend};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let catalog = StaticCatalog::lumber()?;
    let storage: Arc<dyn StorageProvider> = match &config.storage {
        StorageBackend::Memory => {
            tracing::warn!("quote storage is in-memory; quotes are lost on restart");
            Arc::new(MemoryStorageProvider::new())
        }
        StorageBackend::Files(dir) => {
            tracing::info!(dir = %dir.display(), "storing quotes on disk");
            Arc::new(FileStorageProvider::new(dir.clone()))
        }
    };
    tracing::info!(products = catalog.len(), "catalog loaded");

    let app = api::router(AppState { catalog: Arc::new(catalog), storage });

    let addr = config.socket_addr();
    tracing::info!("Made Timber quote service listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}
