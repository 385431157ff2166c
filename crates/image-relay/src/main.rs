//! Image Relay - ephemeral image uploads addressed by random tokens
//!
//! Uploads are held in memory for a limited time and optionally mirrored
//! to local disk or Uploadcare.

mod config;
mod error;
mod remote;
mod server;
mod types;
mod upload;

use crate::config::{RelayConfig, StorageKind};
use crate::error::{RelayError, Result};
use crate::remote::UploadcareBackend;
use crate::server::{start_server, ServerState, SharedState};
use expiring_blob_store::{BlobStore, DiskBackend, MemoryBackend, StorageBackend};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};
use uploadcare_client::{UploadcareClient, UploadcareConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter = EnvFilter::from_default_env().add_directive("image_relay=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    info!("Starting Image Relay...");

    let config = RelayConfig::from_env()?;
    info!("Port: {}", config.port);
    info!("Storage backend: {:?}", config.storage);
    info!(
        "Default TTL: {}",
        config
            .default_ttl
            .map(|t| format!("{} seconds", t.as_secs()))
            .unwrap_or_else(|| "none".to_string())
    );
    info!(
        "Max upload size: {} MB",
        config.max_upload_bytes / (1024 * 1024)
    );

    let backend = create_backend(&config).await?;
    let store = BlobStore::with_backend(backend);

    let port = config.port;
    let state: SharedState = Arc::new(ServerState::new(store, config));

    // Runs until ctrl-c
    start_server(state.clone(), port)
        .await
        .map_err(|e| RelayError::Config(format!("Server error: {}", e)))?;

    let purged = state.store.purge().await;
    info!(purged, "Shutdown complete");

    Ok(())
}

async fn create_backend(config: &RelayConfig) -> Result<Arc<dyn StorageBackend>> {
    match config.storage {
        StorageKind::Memory => Ok(Arc::new(MemoryBackend)),
        StorageKind::Disk => {
            let backend = DiskBackend::new(config.upload_dir.clone());
            backend.init().await?;
            Ok(Arc::new(backend))
        }
        StorageKind::Uploadcare => {
            let settings = config.uploadcare.clone().ok_or_else(|| {
                RelayError::Config("UPLOADCARE_PUBLIC_KEY is required".to_string())
            })?;

            let mut client_config = UploadcareConfig::new(settings.public_key);
            if let Some(secret_key) = settings.secret_key {
                client_config = client_config.with_secret_key(secret_key);
            } else {
                info!("UPLOADCARE_SECRET_KEY not set; expired files will stay on the CDN");
            }
            if let Some(cdn_base_url) = settings.cdn_base_url {
                client_config = client_config.with_cdn_base_url(cdn_base_url);
            }

            Ok(Arc::new(UploadcareBackend::new(UploadcareClient::new(
                client_config,
            ))))
        }
    }
}
