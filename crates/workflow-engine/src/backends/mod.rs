//! Tool Backends: four deterministic, in-memory state machines that back
//! the Tool Registry. They are injected, not discovered, so tests and the
//! CLI can substitute their own fixture universe.

pub mod accounts;
pub mod crm;
pub mod documents;
pub mod notifications;

pub use accounts::{AccountRecord, AccountSystemBackend, DuplicateAccount};
pub use crm::{ClientRecord, CrmBackend};
pub use documents::{DocumentRecord, DocumentStoreBackend};
pub use notifications::{NotificationRecord, NotificationSinkBackend};

use std::sync::Arc;

use serde_json::{json, Map, Value};

/// The process-wide backend bundle a `ToolRegistry` resolves calls against.
/// Cloning is cheap -- every field is an `Arc`.
#[derive(Clone, Default)]
pub struct ToolBackends {
    pub crm: Arc<CrmBackend>,
    pub documents: Arc<DocumentStoreBackend>,
    pub accounts: Arc<AccountSystemBackend>,
    pub notifications: Arc<NotificationSinkBackend>,
}

impl ToolBackends {
    pub fn new() -> Self {
        Self {
            crm: Arc::new(CrmBackend::new()),
            documents: Arc::new(DocumentStoreBackend::new()),
            accounts: Arc::new(AccountSystemBackend::new()),
            notifications: Arc::new(NotificationSinkBackend::new()),
        }
    }

    /// Seeds the fixture universe used by the example scenarios: six
    /// clients spanning the happy path, a pre-existing account,
    /// ineligibility, and an invalid document.
    pub async fn with_example_fixtures() -> Self {
        let backends = Self::new();

        backends
            .crm
            .seed(ClientRecord {
                client_id: "C1".to_string(),
                name: "Avery Chen".to_string(),
                age: 35,
                income: 120_000,
                existing_accounts: vec![],
            })
            .await;
        backends.documents.seed(valid_document("C1", "tax_return")).await;
        backends.documents.seed(valid_document("C1", "application_form")).await;

        backends
            .crm
            .seed(ClientRecord {
                client_id: "C2".to_string(),
                name: "Priya Natarajan".to_string(),
                age: 41,
                income: 95_000,
                existing_accounts: vec!["ROTH_IRA-1001".to_string()],
            })
            .await;
        backends.documents.seed(valid_document("C2", "tax_return")).await;
        backends.documents.seed(valid_document("C2", "application_form")).await;
        backends.accounts.seed_account("C2", "ROTH_IRA", "ROTH_IRA-1001");

        backends
            .crm
            .seed(ClientRecord {
                client_id: "C3".to_string(),
                name: "Marcus Webb".to_string(),
                age: 52,
                income: 500_000,
                existing_accounts: vec![],
            })
            .await;
        backends.documents.seed(valid_document("C3", "tax_return")).await;
        backends.documents.seed(valid_document("C3", "application_form")).await;

        backends
            .crm
            .seed(ClientRecord {
                client_id: "C4".to_string(),
                name: "Dana Osei".to_string(),
                age: 29,
                income: 85_000,
                existing_accounts: vec![],
            })
            .await;
        let mut invalid_tax_return = valid_document("C4", "tax_return");
        invalid_tax_return.valid = false;
        invalid_tax_return.errors = vec!["signature missing".to_string()];
        backends.documents.seed(invalid_tax_return).await;
        backends.documents.seed(valid_document("C4", "application_form")).await;

        for client_id in ["C5", "C6"] {
            backends
                .crm
                .seed(ClientRecord {
                    client_id: client_id.to_string(),
                    name: format!("Client {client_id}"),
                    age: 33,
                    income: 88_000,
                    existing_accounts: vec![],
                })
                .await;
            backends.documents.seed(valid_document(client_id, "tax_return")).await;
            backends.documents.seed(valid_document(client_id, "application_form")).await;
        }

        backends
    }
}

fn valid_document(client_id: &str, doc_type: &str) -> DocumentRecord {
    let mut record = DocumentRecord::new(client_id, doc_type);
    record.status = "submitted".to_string();
    record.verified = true;
    record.uploaded = true;
    record.valid = true;
    record.fields = fields([field("doc_type", doc_type)]);
    record
}

/// Convenience builder used by tests that want a single ad-hoc field set
/// without pulling in `serde_json::Map` directly.
pub fn field(key: &str, value: impl Into<Value>) -> (String, Value) {
    (key.to_string(), value.into())
}

pub fn fields(pairs: impl IntoIterator<Item = (String, Value)>) -> Map<String, Value> {
    pairs.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn example_fixtures_seed_six_distinct_clients() {
        let backends = ToolBackends::with_example_fixtures().await;
        for client_id in ["C1", "C2", "C3", "C4", "C5", "C6"] {
            assert!(backends.crm.get(client_id).await.is_some(), "missing fixture client {client_id}");
        }
        assert!(backends.accounts.get("ROTH_IRA-1001").is_some());
    }

    #[test]
    fn field_and_fields_helpers_build_a_map() {
        let m = fields([field("a", json!(1)), field("b", json!("x"))]);
        assert_eq!(m.get("a"), Some(&json!(1)));
    }
}
