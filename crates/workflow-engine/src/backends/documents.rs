//! Mock document store backend: per-(client, doc type) document records
//! with read/create/update/validate semantics.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub client_id: String,
    pub doc_type: String,
    pub status: String,
    pub verified: bool,
    pub uploaded: bool,
    pub valid: bool,
    pub errors: Vec<String>,
    pub fields: Map<String, Value>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentRecord {
    pub fn new(client_id: impl Into<String>, doc_type: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            doc_type: doc_type.into(),
            status: "draft".to_string(),
            verified: false,
            uploaded: false,
            valid: false,
            errors: Vec::new(),
            fields: Map::new(),
            updated_at: Utc::now(),
        }
    }
}

fn key(client_id: &str, doc_type: &str) -> (String, String) {
    (client_id.to_string(), doc_type.to_string())
}

#[derive(Debug, Default)]
pub struct DocumentStoreBackend {
    docs: RwLock<HashMap<(String, String), DocumentRecord>>,
}

impl DocumentStoreBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, record: DocumentRecord) {
        let k = key(&record.client_id, &record.doc_type);
        self.docs.write().await.insert(k, record);
    }

    pub async fn get(&self, client_id: &str, doc_type: &str) -> Option<DocumentRecord> {
        self.docs.read().await.get(&key(client_id, doc_type)).cloned()
    }

    /// Idempotent upsert: calling twice with the same fields leaves a
    /// single record, refreshed in place.
    pub async fn create(&self, client_id: &str, doc_type: &str, data: Map<String, Value>) -> DocumentRecord {
        let k = key(client_id, doc_type);
        let mut docs = self.docs.write().await;
        let record = docs.entry(k).or_insert_with(|| DocumentRecord::new(client_id, doc_type));
        record.fields.extend(data);
        record.status = "submitted".to_string();
        record.uploaded = true;
        record.updated_at = Utc::now();
        record.clone()
    }

    pub async fn update(&self, client_id: &str, doc_type: &str, data: Map<String, Value>) -> Option<DocumentRecord> {
        let k = key(client_id, doc_type);
        let mut docs = self.docs.write().await;
        let record = docs.get_mut(&k)?;
        record.fields.extend(data);
        record.updated_at = Utc::now();
        Some(record.clone())
    }

    /// Reports the record's current `valid`/`errors` fields, which fixture
    /// seeding sets directly for deterministic tests.
    pub async fn validate(&self, client_id: &str, doc_type: &str) -> Option<(bool, Vec<String>)> {
        let record = self.get(client_id, doc_type).await?;
        Some((record.valid, record.errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_is_idempotent_upsert() {
        let store = DocumentStoreBackend::new();
        let mut data = Map::new();
        data.insert("full_name".into(), Value::String("A".into()));
        let first = store.create("C1", "application_form", data.clone()).await;
        let second = store.create("C1", "application_form", data).await;
        assert_eq!(first.client_id, second.client_id);
        assert_eq!(store.get("C1", "application_form").await.unwrap().status, "submitted");
    }

    #[tokio::test]
    async fn validate_reflects_seeded_flag() {
        let store = DocumentStoreBackend::new();
        let mut rec = DocumentRecord::new("C4", "tax_return");
        rec.valid = false;
        rec.errors = vec!["missing signature".to_string()];
        store.seed(rec).await;
        let (valid, errors) = store.validate("C4", "tax_return").await.unwrap();
        assert!(!valid);
        assert_eq!(errors, vec!["missing signature".to_string()]);
    }
}
