//! Hosted realtime-tree store (Firebase RTDB style REST).
//!
//! The tree holds two nodes: `cvData` (the document) and `views` (the event
//! log, `{"views": [...]}`). Nodes are addressed as `{base}/{node}.json`;
//! `PUT` replaces a node, `PATCH` overlays its top-level children — which is
//! exactly the merge-write contract, so merge saves need no read first.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::auth::CredentialValidator;
use crate::models::cv::CVDocument;
use crate::models::view::{ViewEvent, ViewLog};
use crate::store::{check_save, SaveMode, StoreAdapter, StoreError};

const CV_NODE: &str = "cvData";
const VIEWS_NODE: &str = "views";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct RealtimeStore {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
    validator: Arc<dyn CredentialValidator>,
}

impl RealtimeStore {
    pub fn new(
        base_url: String,
        auth_token: Option<String>,
        validator: Arc<dyn CredentialValidator>,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token,
            validator,
        }
    }

    fn node_url(&self, node: &str) -> String {
        match &self.auth_token {
            Some(token) => format!("{}/{node}.json?auth={token}", self.base_url),
            None => format!("{}/{node}.json", self.base_url),
        }
    }

    async fn get_node(&self, node: &str) -> Result<Value, StoreError> {
        let response = self
            .client
            .get(self.node_url(node))
            .send()
            .await
            .map_err(to_unavailable)?;
        let response = ensure_success(response)?;
        response.json::<Value>().await.map_err(|e| {
            StoreError::Corrupt(format!("realtime node '{node}' returned invalid JSON: {e}"))
        })
    }

    async fn put_node(&self, node: &str, value: &Value) -> Result<(), StoreError> {
        let response = self
            .client
            .put(self.node_url(node))
            .json(value)
            .send()
            .await
            .map_err(to_unavailable)?;
        ensure_success(response)?;
        Ok(())
    }

    async fn patch_node(&self, node: &str, value: &Value) -> Result<(), StoreError> {
        let response = self
            .client
            .patch(self.node_url(node))
            .json(value)
            .send()
            .await
            .map_err(to_unavailable)?;
        ensure_success(response)?;
        Ok(())
    }
}

fn to_unavailable(e: reqwest::Error) -> StoreError {
    StoreError::Unavailable(format!("realtime backend: {e}"))
}

fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(StoreError::Unauthorized);
    }
    if !status.is_success() {
        return Err(StoreError::Unavailable(format!(
            "realtime backend returned {status}"
        )));
    }
    Ok(response)
}

#[async_trait]
impl StoreAdapter for RealtimeStore {
    async fn load_document(&self) -> Result<Value, StoreError> {
        // An unset node reads back as JSON null.
        match self.get_node(CV_NODE).await? {
            Value::Null => Ok(CVDocument::default_value()),
            doc => Ok(doc),
        }
    }

    async fn save_document(
        &self,
        doc: &Value,
        mode: SaveMode,
        credential: &str,
    ) -> Result<(), StoreError> {
        check_save(self.validator.as_ref(), credential, doc).await?;
        match mode {
            SaveMode::Replace => self.put_node(CV_NODE, doc).await,
            SaveMode::Merge => self.patch_node(CV_NODE, doc).await,
        }
    }

    async fn append_event(&self, event: &ViewEvent) -> Result<(), StoreError> {
        // Read-modify-write of the whole log; retention applies before the put.
        let mut log: ViewLog = match self.get_node(VIEWS_NODE).await? {
            Value::Null => ViewLog::default(),
            value => serde_json::from_value(value)
                .map_err(|e| StoreError::Corrupt(format!("views log: {e}")))?,
        };
        log.append(event.clone());
        let value = serde_json::to_value(&log)
            .map_err(|e| StoreError::Unavailable(format!("serialize views log: {e}")))?;
        self.put_node(VIEWS_NODE, &value).await
    }

    async fn list_events(&self) -> Result<Vec<ViewEvent>, StoreError> {
        match self.get_node(VIEWS_NODE).await? {
            Value::Null => Ok(Vec::new()),
            value => {
                let log: ViewLog = serde_json::from_value(value)
                    .map_err(|e| StoreError::Corrupt(format!("views log: {e}")))?;
                Ok(log.views)
            }
        }
    }
}
