//! Credential validation — pluggable, trait-based check for admin writes.
//!
//! Deployments across the project's history used three schemes (shared secret
//! header, backend-stored secret, federated identity + admin flag). Exactly
//! one implementation is active per deployment; this repo ships the shared
//! secret. The trait is async so a backend-stored lookup can slot in without
//! touching sessions, stores or handlers.
//!
//! Carried in `AppState` as `Arc<dyn CredentialValidator>`.

use async_trait::async_trait;

#[async_trait]
pub trait CredentialValidator: Send + Sync {
    /// Returns true when `credential` authorizes admin writes.
    async fn validate(&self, credential: &str) -> bool;
}

/// Exact-equality comparison against the configured admin password.
/// The password lives in process memory only and is never logged.
pub struct SharedSecretValidator {
    secret: String,
}

impl SharedSecretValidator {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }
}

#[async_trait]
impl CredentialValidator for SharedSecretValidator {
    async fn validate(&self, credential: &str) -> bool {
        !credential.is_empty() && credential == self.secret
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_accepts_exact_match() {
        let validator = SharedSecretValidator::new("hunter2".to_string());
        assert!(validator.validate("hunter2").await);
    }

    #[tokio::test]
    async fn test_rejects_wrong_secret() {
        let validator = SharedSecretValidator::new("hunter2".to_string());
        assert!(!validator.validate("hunter3").await);
        assert!(!validator.validate("Hunter2").await);
    }

    #[tokio::test]
    async fn test_rejects_empty_credential_even_with_empty_secret() {
        let validator = SharedSecretValidator::new(String::new());
        assert!(!validator.validate("").await);
    }
}
