//! Mock CRM backend: read-only client profile fixture data.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRecord {
    pub client_id: String,
    pub name: String,
    pub age: u32,
    pub income: u64,
    pub existing_accounts: Vec<String>,
}

/// In-memory, pre-seeded client directory. Deterministic given a fixed
/// fixture set; performs no I/O.
#[derive(Debug, Default)]
pub struct CrmBackend {
    clients: RwLock<HashMap<String, ClientRecord>>,
}

impl CrmBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, record: ClientRecord) {
        self.clients.write().await.insert(record.client_id.clone(), record);
    }

    pub async fn get(&self, client_id: &str) -> Option<ClientRecord> {
        self.clients.read().await.get(client_id).cloned()
    }

    /// A Roth IRA is only available under the standard contribution-limit
    /// income threshold used by this fixture universe.
    pub fn roth_ira_income_limit() -> u64 {
        161_000
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_client_returns_none() {
        let crm = CrmBackend::new();
        assert!(crm.get("nobody").await.is_none());
    }

    #[tokio::test]
    async fn seeded_client_round_trips() {
        let crm = CrmBackend::new();
        crm.seed(ClientRecord {
            client_id: "C1".to_string(),
            name: "Jordan Lee".to_string(),
            age: 35,
            income: 120_000,
            existing_accounts: vec![],
        })
        .await;
        let rec = crm.get("C1").await.unwrap();
        assert_eq!(rec.name, "Jordan Lee");
    }
}
