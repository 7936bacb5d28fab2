use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// Which persistence backend the store adapter is built on.
/// Selected once at startup; request handlers never branch on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// JSON files under `DATA_DIR`, atomically rewritten on every update.
    Local,
    /// Hosted realtime JSON tree (Firebase RTDB style) over REST.
    Realtime,
    /// Hosted document collection (Firestore style) over REST.
    Firestore,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(StorageBackend::Local),
            "realtime" => Ok(StorageBackend::Realtime),
            "firestore" => Ok(StorageBackend::Firestore),
            other => bail!("Unknown storage backend '{other}' (expected local, realtime or firestore)"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Backend-specific variables are only required for the selected backend.
#[derive(Debug, Clone)]
pub struct Config {
    pub admin_password: String,
    pub storage_backend: StorageBackend,
    pub data_dir: PathBuf,
    pub firebase_database_url: Option<String>,
    pub firestore_project_id: Option<String>,
    pub firebase_auth_token: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let storage_backend = std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "local".to_string())
            .parse::<StorageBackend>()?;

        let config = Config {
            admin_password: require_env("ADMIN_PASSWORD")?,
            storage_backend,
            data_dir: std::env::var("DATA_DIR")
                .unwrap_or_else(|_| "data".to_string())
                .into(),
            firebase_database_url: std::env::var("FIREBASE_DATABASE_URL").ok(),
            firestore_project_id: std::env::var("FIRESTORE_PROJECT_ID").ok(),
            firebase_auth_token: std::env::var("FIREBASE_AUTH_TOKEN").ok(),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        };

        match config.storage_backend {
            StorageBackend::Realtime if config.firebase_database_url.is_none() => {
                bail!("FIREBASE_DATABASE_URL is required when STORAGE_BACKEND=realtime")
            }
            StorageBackend::Firestore if config.firestore_project_id.is_none() => {
                bail!("FIRESTORE_PROJECT_ID is required when STORAGE_BACKEND=firestore")
            }
            _ => Ok(config),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
