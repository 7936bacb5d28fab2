mod analytics;
mod auth;
mod config;
mod document;
mod errors;
mod geoip;
mod models;
mod routes;
mod session;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::{CredentialValidator, SharedSecretValidator};
use crate::config::{Config, StorageBackend};
use crate::geoip::GeoLookup;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::firestore::FirestoreStore;
use crate::store::local::LocalStore;
use crate::store::realtime::RealtimeStore;
use crate::store::StoreAdapter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV API v{}", env!("CARGO_PKG_VERSION"));

    // Exactly one credential scheme is active per deployment
    let validator: Arc<dyn CredentialValidator> =
        Arc::new(SharedSecretValidator::new(config.admin_password.clone()));

    // Select the store adapter once at startup; handlers never branch on it
    let store: Arc<dyn StoreAdapter> = match config.storage_backend {
        StorageBackend::Local => Arc::new(LocalStore::new(&config.data_dir, validator.clone())?),
        StorageBackend::Realtime => {
            let base_url = config
                .firebase_database_url
                .clone()
                .context("FIREBASE_DATABASE_URL is required when STORAGE_BACKEND=realtime")?;
            Arc::new(RealtimeStore::new(
                base_url,
                config.firebase_auth_token.clone(),
                validator.clone(),
            ))
        }
        StorageBackend::Firestore => {
            let project_id = config
                .firestore_project_id
                .clone()
                .context("FIRESTORE_PROJECT_ID is required when STORAGE_BACKEND=firestore")?;
            Arc::new(FirestoreStore::new(
                project_id,
                config.firebase_auth_token.clone(),
                validator.clone(),
            ))
        }
    };
    info!("Storage backend: {:?}", config.storage_backend);

    // Build app state
    let state = AppState {
        store,
        validator,
        geo: GeoLookup::new(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // the public CV view is served cross-origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    // Connect info is needed to attribute views to the socket peer when no
    // proxy headers are present.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
