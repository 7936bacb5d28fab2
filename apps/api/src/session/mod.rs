#![allow(dead_code)]

//! Editor session — the state machine behind the admin editor.
//!
//! One session per editing user, holding the in-memory working copy of the
//! CV document. States: `Unauthenticated → Authenticating → Authenticated`,
//! back to `Unauthenticated` on logout or on a credential rejected at save
//! time. Edits never touch the store; `save()` pushes the working copy as a
//! merge write. No failure discards unsaved edits.
//!
//! Sessions are plain objects: tests (and a future multi-admin editor) can
//! run several in isolation, each against its own store.

use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use tokio::sync::Mutex as AsyncMutex;

use crate::auth::CredentialValidator;
use crate::document::path::{self, PathError};
use crate::document::skills;
use crate::errors::AppError;
use crate::store::{SaveMode, StoreAdapter, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticating,
    Authenticated,
}

struct Inner {
    state: SessionState,
    /// Held in process memory only for the session lifetime. Never persisted,
    /// never logged.
    credential: Option<String>,
    working_copy: Value,
}

pub struct EditorSession {
    store: Arc<dyn StoreAdapter>,
    validator: Arc<dyn CredentialValidator>,
    inner: Mutex<Inner>,
    /// Serializes saves: a second `save()` issued while one is in flight
    /// queues here instead of racing it with an interleaved snapshot.
    save_gate: AsyncMutex<()>,
}

impl EditorSession {
    /// Opens a session over the current stored document (or the default one
    /// when storage is empty). The session starts unauthenticated; the
    /// document is readable for display before sign-in.
    pub async fn open(
        store: Arc<dyn StoreAdapter>,
        validator: Arc<dyn CredentialValidator>,
    ) -> Result<Self, AppError> {
        let working_copy = store.load_document().await?;
        Ok(Self {
            store,
            validator,
            inner: Mutex::new(Inner {
                state: SessionState::Unauthenticated,
                credential: None,
                working_copy,
            }),
            save_gate: AsyncMutex::new(()),
        })
    }

    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    pub fn working_copy(&self) -> Value {
        self.lock().working_copy.clone()
    }

    /// Validates `secret` against the configured credential. On success the
    /// session becomes `Authenticated` and holds the credential for its
    /// lifetime; on failure nothing is retained and the caller is re-prompted.
    pub async fn submit_credential(&self, secret: &str) -> Result<(), AppError> {
        self.lock().state = SessionState::Authenticating;
        if self.validator.validate(secret).await {
            let mut inner = self.lock();
            inner.state = SessionState::Authenticated;
            inner.credential = Some(secret.to_string());
            Ok(())
        } else {
            let mut inner = self.lock();
            inner.state = SessionState::Unauthenticated;
            inner.credential = None;
            Err(AppError::Authentication)
        }
    }

    /// Discards the credential. The working copy stays readable but no save
    /// can happen until re-authentication.
    pub fn logout(&self) {
        let mut inner = self.lock();
        inner.state = SessionState::Unauthenticated;
        inner.credential = None;
    }

    /// Places `value` at the dotted `path` in the working copy. In-memory
    /// only; the store is untouched until `save()`.
    pub fn edit(&self, path: &str, value: Value) -> Result<(), AppError> {
        let mut inner = self.lock_authenticated()?;
        let updated = path::set(&inner.working_copy, path, value).map_err(to_validation)?;
        inner.working_copy = updated;
        Ok(())
    }

    pub fn append_item(&self, path: &str, item: Value) -> Result<(), AppError> {
        let mut inner = self.lock_authenticated()?;
        let updated =
            path::append_to_sequence(&inner.working_copy, path, item).map_err(to_validation)?;
        inner.working_copy = updated;
        Ok(())
    }

    pub fn remove_item(&self, path: &str, index: usize) -> Result<(), AppError> {
        let mut inner = self.lock_authenticated()?;
        let updated =
            path::remove_from_sequence(&inner.working_copy, path, index).map_err(to_validation)?;
        inner.working_copy = updated;
        Ok(())
    }

    pub fn rename_skill(
        &self,
        category_path: &str,
        index: usize,
        name: &str,
    ) -> Result<(), AppError> {
        let mut inner = self.lock_authenticated()?;
        let updated = skills::set_skill_name(&inner.working_copy, category_path, index, name)
            .map_err(to_validation)?;
        inner.working_copy = updated;
        Ok(())
    }

    pub fn rate_skill(
        &self,
        category_path: &str,
        index: usize,
        proficiency: u8,
    ) -> Result<(), AppError> {
        let mut inner = self.lock_authenticated()?;
        let updated =
            skills::set_skill_proficiency(&inner.working_copy, category_path, index, proficiency)
                .map_err(to_validation)?;
        inner.working_copy = updated;
        Ok(())
    }

    /// Pushes the working copy to the store as a merge write.
    ///
    /// A rejected credential (`Unauthorized`) forces the session back to
    /// `Unauthenticated` and discards the credential so a later save cannot
    /// silently reuse it; the working copy — including unsaved edits — stays
    /// in memory. Any other failure is retryable and leaves the session
    /// authenticated.
    pub async fn save(&self) -> Result<(), AppError> {
        let _serialized = self.save_gate.lock().await;

        let (credential, snapshot) = {
            let inner = self.lock();
            if inner.state != SessionState::Authenticated {
                return Err(AppError::Unauthorized);
            }
            match &inner.credential {
                Some(credential) => (credential.clone(), inner.working_copy.clone()),
                None => return Err(AppError::Unauthorized),
            }
        };

        match self
            .store
            .save_document(&snapshot, SaveMode::Merge, &credential)
            .await
        {
            Ok(()) => Ok(()),
            Err(StoreError::Unauthorized) => {
                let mut inner = self.lock();
                inner.state = SessionState::Unauthenticated;
                inner.credential = None;
                Err(AppError::Unauthorized)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_authenticated(&self) -> Result<MutexGuard<'_, Inner>, AppError> {
        let inner = self.lock();
        if inner.state != SessionState::Authenticated {
            return Err(AppError::Unauthorized);
        }
        Ok(inner)
    }
}

fn to_validation(err: PathError) -> AppError {
    AppError::Validation(err.to_string())
}
