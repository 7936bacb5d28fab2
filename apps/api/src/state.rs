use std::sync::Arc;

use crate::auth::CredentialValidator;
use crate::geoip::GeoLookup;
use crate::store::StoreAdapter;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Persistence backend selected at startup from configuration.
    pub store: Arc<dyn StoreAdapter>,
    /// Pluggable credential check. Default: SharedSecretValidator.
    pub validator: Arc<dyn CredentialValidator>,
    pub geo: GeoLookup,
}
