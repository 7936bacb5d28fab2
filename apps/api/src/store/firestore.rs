//! Hosted document-collection store (Firestore REST).
//!
//! Layout: the CV lives at `cv/current` (a singleton document); view events
//! are individual documents in the `views` collection with auto IDs. The
//! REST API wraps every value in a typed envelope (`stringValue`,
//! `integerValue`, `mapValue`, ...), so this module carries a small codec
//! between that encoding and plain JSON.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Map, Value};

use crate::auth::CredentialValidator;
use crate::models::cv::CVDocument;
use crate::models::view::ViewEvent;
use crate::store::{check_save, merge_top_level, SaveMode, StoreAdapter, StoreError};

const CV_DOC: &str = "cv/current";
const VIEWS_COLLECTION: &str = "views";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const LIST_PAGE_SIZE: usize = 10_000;

pub struct FirestoreStore {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
    validator: Arc<dyn CredentialValidator>,
}

impl FirestoreStore {
    pub fn new(
        project_id: String,
        auth_token: Option<String>,
        validator: Arc<dyn CredentialValidator>,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            base_url: format!(
                "https://firestore.googleapis.com/v1/projects/{project_id}/databases/(default)/documents"
            ),
            auth_token,
            validator,
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, StoreError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(format!("firestore backend: {e}")))?;
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(StoreError::Unauthorized);
        }
        Ok(response)
    }

    /// Fetches one document's fields as plain JSON; `None` when it does not exist.
    async fn get_document(&self, doc_path: &str) -> Result<Option<Value>, StoreError> {
        let url = format!("{}/{doc_path}", self.base_url);
        let response = self.send(self.client.get(url)).await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(StoreError::Unavailable(format!(
                "firestore backend returned {}",
                response.status()
            )));
        }
        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::Corrupt(format!("firestore document body: {e}")))?;
        Ok(Some(decode_document(&body)))
    }

    /// Writes a document wholesale. A `PATCH` without an update mask creates
    /// the document or replaces all of its fields.
    async fn put_document(&self, doc_path: &str, fields: &Value) -> Result<(), StoreError> {
        let url = format!("{}/{doc_path}", self.base_url);
        let body = json!({ "fields": encode_fields(fields) });
        let response = self.send(self.client.patch(url).json(&body)).await?;
        if !response.status().is_success() {
            return Err(StoreError::Unavailable(format!(
                "firestore backend returned {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn create_document(&self, collection: &str, fields: &Value) -> Result<(), StoreError> {
        let url = format!("{}/{collection}", self.base_url);
        let body = json!({ "fields": encode_fields(fields) });
        let response = self.send(self.client.post(url).json(&body)).await?;
        if !response.status().is_success() {
            return Err(StoreError::Unavailable(format!(
                "firestore backend returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl StoreAdapter for FirestoreStore {
    async fn load_document(&self) -> Result<Value, StoreError> {
        Ok(self
            .get_document(CV_DOC)
            .await?
            .unwrap_or_else(CVDocument::default_value))
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
            // Merge client-side so the stored document stays a single value;
            // a field-mask PATCH would leave dropped nested keys behind.
            SaveMode::Merge => {
                let existing = self
                    .get_document(CV_DOC)
                    .await?
                    .unwrap_or_else(CVDocument::default_value);
                merge_top_level(&existing, doc)
            }
        };
        self.put_document(CV_DOC, &to_store).await
    }

    async fn append_event(&self, event: &ViewEvent) -> Result<(), StoreError> {
        // Events are one document each; the hosted collection is not subject
        // to the bounded-retention trim of the single-value backends.
        let value = serde_json::to_value(event)
            .map_err(|e| StoreError::Unavailable(format!("serialize event: {e}")))?;
        self.create_document(VIEWS_COLLECTION, &value).await
    }

    async fn list_events(&self) -> Result<Vec<ViewEvent>, StoreError> {
        let url = format!(
            "{}/{VIEWS_COLLECTION}?pageSize={LIST_PAGE_SIZE}",
            self.base_url
        );
        let response = self.send(self.client.get(url)).await?;
        if !response.status().is_success() {
            return Err(StoreError::Unavailable(format!(
                "firestore backend returned {}",
                response.status()
            )));
        }
        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::Corrupt(format!("firestore list body: {e}")))?;
        let documents = match body.get("documents").and_then(Value::as_array) {
            Some(documents) => documents,
            None => return Ok(Vec::new()),
        };
        documents
            .iter()
            .map(|doc| {
                serde_json::from_value(decode_document(doc))
                    .map_err(|e| StoreError::Corrupt(format!("stored view event: {e}")))
            })
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Typed-value codec
// ────────────────────────────────────────────────────────────────────────────

fn decode_document(body: &Value) -> Value {
    match body.get("fields").and_then(Value::as_object) {
        Some(fields) => decode_fields(fields),
        None => Value::Object(Map::new()),
    }
}

fn encode_fields(value: &Value) -> Value {
    let mut fields = Map::new();
    if let Some(map) = value.as_object() {
        for (key, item) in map {
            fields.insert(key.clone(), encode_value(item));
        }
    }
    Value::Object(fields)
}

fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        // Integers travel as strings in the REST encoding.
        Value::Number(n) if n.as_i64().is_some() => {
            json!({ "integerValue": n.to_string() })
        }
        Value::Number(n) => json!({ "doubleValue": n.as_f64() }),
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": {
                "values": items.iter().map(encode_value).collect::<Vec<_>>()
            }
        }),
        Value::Object(_) => json!({ "mapValue": { "fields": encode_fields(value) } }),
    }
}

fn decode_fields(fields: &Map<String, Value>) -> Value {
    let mut out = Map::new();
    for (key, wrapped) in fields {
        out.insert(key.clone(), decode_value(wrapped));
    }
    Value::Object(out)
}

fn decode_value(wrapped: &Value) -> Value {
    let Some(map) = wrapped.as_object() else {
        return Value::Null;
    };
    if map.contains_key("nullValue") {
        return Value::Null;
    }
    if let Some(b) = map.get("booleanValue") {
        return b.clone();
    }
    if let Some(i) = map.get("integerValue") {
        let parsed = i
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .or_else(|| i.as_i64());
        return match parsed {
            Some(n) => json!(n),
            None => Value::Null,
        };
    }
    if let Some(d) = map.get("doubleValue") {
        return d.clone();
    }
    if let Some(s) = map.get("stringValue") {
        return s.clone();
    }
    if let Some(t) = map.get("timestampValue") {
        return t.clone();
    }
    if let Some(values) = map
        .get("arrayValue")
        .and_then(|a| a.get("values"))
        .and_then(Value::as_array)
    {
        return Value::Array(values.iter().map(decode_value).collect());
    }
    if map.get("arrayValue").is_some() {
        // An empty arrayValue omits "values" entirely.
        return Value::Array(Vec::new());
    }
    if let Some(fields) = map
        .get("mapValue")
        .and_then(|m| m.get("fields"))
        .and_then(Value::as_object)
    {
        return decode_fields(fields);
    }
    if map.get("mapValue").is_some() {
        return Value::Object(Map::new());
    }
    Value::Null
}
