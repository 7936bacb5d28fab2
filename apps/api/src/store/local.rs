//! Local-file store — the fallback backend when no hosted database is
//! configured. One JSON document for the CV, one for the bounded event list,
//! each atomically rewritten on every update (whole-file replace via a
//! temp file persisted over the target, no partial patching).

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::info;

use crate::auth::CredentialValidator;
use crate::models::cv::CVDocument;
use crate::models::view::{ViewEvent, ViewLog};
use crate::store::{check_save, merge_top_level, SaveMode, StoreAdapter, StoreError};

const CV_FILE: &str = "cv-data.json";
const VIEWS_FILE: &str = "views.json";

pub struct LocalStore {
    cv_path: PathBuf,
    views_path: PathBuf,
    validator: Arc<dyn CredentialValidator>,
}

impl LocalStore {
    pub fn new(
        data_dir: &Path,
        validator: Arc<dyn CredentialValidator>,
    ) -> Result<Self, StoreError> {
        fs::create_dir_all(data_dir).map_err(|e| {
            StoreError::Unavailable(format!("cannot create data dir {}: {e}", data_dir.display()))
        })?;
        info!("Local store using {}", data_dir.display());
        Ok(Self {
            cv_path: data_dir.join(CV_FILE),
            views_path: data_dir.join(VIEWS_FILE),
            validator,
        })
    }

    fn read_value(path: &Path) -> Result<Option<Value>, StoreError> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(path)
            .map_err(|e| StoreError::Unavailable(format!("read {}: {e}", path.display())))?;
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StoreError::Corrupt(format!("parse {}: {e}", path.display())))
    }

    /// Whole-file replace: write to a temp file in the same directory, then
    /// rename over the target so readers never observe a half-written file.
    fn write_atomic(path: &Path, value: &Value) -> Result<(), StoreError> {
        let parent = path
            .parent()
            .ok_or_else(|| StoreError::Unavailable(format!("no parent dir for {}", path.display())))?;
        let mut tmp = NamedTempFile::new_in(parent)
            .map_err(|e| StoreError::Unavailable(format!("temp file in {}: {e}", parent.display())))?;
        serde_json::to_writer_pretty(&mut tmp, value)
            .map_err(|e| StoreError::Unavailable(format!("serialize {}: {e}", path.display())))?;
        tmp.persist(path)
            .map_err(|e| StoreError::Unavailable(format!("persist {}: {e}", path.display())))?;
        Ok(())
    }

    fn read_views(&self) -> Result<ViewLog, StoreError> {
        match Self::read_value(&self.views_path)? {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| StoreError::Corrupt(format!("views log: {e}"))),
            None => Ok(ViewLog::default()),
        }
    }
}

#[async_trait]
impl StoreAdapter for LocalStore {
    async fn load_document(&self) -> Result<Value, StoreError> {
        Ok(Self::read_value(&self.cv_path)?.unwrap_or_else(CVDocument::default_value))
    }

    async fn save_document(
        &self,
        doc: &Value,
        mode: SaveMode,
        credential: &str,
    ) -> Result<(), StoreError> {
        check_save(self.validator.as_ref(), credential, doc).await?;
        let to_store = match mode {
            SaveMode::Replace => doc.clone(),
            SaveMode::Merge => {
                let existing =
                    Self::read_value(&self.cv_path)?.unwrap_or_else(CVDocument::default_value);
                merge_top_level(&existing, doc)
            }
        };
        Self::write_atomic(&self.cv_path, &to_store)
    }

    async fn append_event(&self, event: &ViewEvent) -> Result<(), StoreError> {
        let mut log = self.read_views()?;
        log.append(event.clone());
        let value = serde_json::to_value(&log)
            .map_err(|e| StoreError::Unavailable(format!("serialize views log: {e}")))?;
        Self::write_atomic(&self.views_path, &value)
    }

    async fn list_events(&self) -> Result<Vec<ViewEvent>, StoreError> {
        Ok(self.read_views()?.views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SharedSecretValidator;
    use crate::models::view::MAX_RETAINED_EVENTS;
    use chrono::Utc;
    use serde_json::json;

    const SECRET: &str = "test-secret";

    fn store(dir: &Path) -> LocalStore {
        LocalStore::new(dir, Arc::new(SharedSecretValidator::new(SECRET.to_string()))).unwrap()
    }

    fn event(ip: &str) -> ViewEvent {
        ViewEvent {
            ip: ip.to_string(),
            country: Some("Sweden".to_string()),
            network: None,
            timestamp: Utc::now(),
            user_agent: Some("tests".to_string()),
        }
    }

    #[tokio::test]
    async fn test_load_on_empty_storage_returns_default_document() {
        let dir = tempfile::tempdir().unwrap();
        let doc = store(dir.path()).load_document().await.unwrap();
        assert_eq!(doc["personalInfo"]["name"], json!("YOUR NAME"));
    }

    #[tokio::test]
    async fn test_replace_save_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let mut doc = CVDocument::default_value();
        doc["contact"]["email"] = json!("a@b.com");
        store
            .save_document(&doc, SaveMode::Replace, SECRET)
            .await
            .unwrap();
        let loaded = store.load_document().await.unwrap();
        assert_eq!(loaded["contact"]["email"], json!("a@b.com"));
    }

    #[tokio::test]
    async fn test_merge_save_preserves_unsupplied_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let mut full = CVDocument::default_value();
        full["extracurriculars"] = json!(["chess"]);
        store
            .save_document(&full, SaveMode::Replace, SECRET)
            .await
            .unwrap();

        let partial = json!({
            "personalInfo": {"name": "Ada", "title": "Engineer"},
            "contact": {"email": "ada@example.com"}
        });
        store
            .save_document(&partial, SaveMode::Merge, SECRET)
            .await
            .unwrap();

        let loaded = store.load_document().await.unwrap();
        assert_eq!(loaded["personalInfo"]["name"], json!("Ada"));
        assert_eq!(loaded["extracurriculars"], json!(["chess"]));
    }

    #[tokio::test]
    async fn test_rejected_credential_leaves_no_partial_write() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let doc = CVDocument::default_value();
        let err = store
            .save_document(&doc, SaveMode::Replace, "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unauthorized));
        assert!(!dir.path().join(CV_FILE).exists());
    }

    #[tokio::test]
    async fn test_incomplete_document_is_rejected_before_write() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let err = store
            .save_document(&json!({"skills": {}}), SaveMode::Replace, SECRET)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidDocument(_)));
        assert!(!dir.path().join(CV_FILE).exists());
    }

    #[tokio::test]
    async fn test_events_append_and_list_in_insertion_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.append_event(&event("1.1.1.1")).await.unwrap();
        store.append_event(&event("2.2.2.2")).await.unwrap();
        let events = store.list_events().await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].ip, "1.1.1.1");
        assert_eq!(events[1].ip, "2.2.2.2");
    }

    #[tokio::test]
    async fn test_retention_evicts_oldest_event_at_cap() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        // Seed a full log on disk, then append the 10_001st event through the store.
        let full = ViewLog {
            views: (0..MAX_RETAINED_EVENTS)
                .map(|i| event(&format!("10.0.{}.{}", i / 256, i % 256)))
                .collect(),
        };
        LocalStore::write_atomic(
            &dir.path().join(VIEWS_FILE),
            &serde_json::to_value(&full).unwrap(),
        )
        .unwrap();

        store.append_event(&event("fresh")).await.unwrap();
        let events = store.list_events().await.unwrap();
        assert_eq!(events.len(), MAX_RETAINED_EVENTS);
        assert_eq!(events[0].ip, "10.0.0.1");
        assert_eq!(events.last().unwrap().ip, "fresh");
    }

    #[tokio::test]
    async fn test_list_events_on_empty_storage_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store(dir.path()).list_events().await.unwrap().is_empty());
    }
}
