//! Mock account system backend: monotonically increasing account numbers
//! with an at-most-one-account-per-type-per-client rule enforced
//! transactionally per call.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

const FIRST_ACCOUNT_NUMBER: u64 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    pub account_number: String,
    pub account_type: String,
    pub client_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct DuplicateAccount {
    pub existing_account_number: String,
}

/// Guarded by a single `parking_lot::Mutex` so the duplicate-check and the
/// counter increment happen as one atomic step -- concurrent workflows for
/// the same client and account type can never both observe "no existing
/// account".
#[derive(Debug, Default)]
pub struct AccountSystemBackend {
    inner: Mutex<AccountsInner>,
}

#[derive(Debug, Default)]
struct AccountsInner {
    next_number_by_type: HashMap<String, u64>,
    accounts_by_client: HashMap<String, HashSet<String>>,
    accounts_by_number: HashMap<String, AccountRecord>,
}

impl AccountSystemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate an account for fixture/test setup (e.g. S2's client
    /// who already holds `ROTH_IRA-1001`). Also advances that type's
    /// counter so later `open_account` calls never collide with the seed.
    pub fn seed_account(&self, client_id: &str, account_type: &str, account_number: &str) {
        let mut inner = self.inner.lock();
        inner
            .accounts_by_client
            .entry(client_id.to_string())
            .or_default()
            .insert(account_type.to_string());
        inner.accounts_by_number.insert(
            account_number.to_string(),
            AccountRecord {
                account_number: account_number.to_string(),
                account_type: account_type.to_string(),
                client_id: client_id.to_string(),
                status: "active".to_string(),
                created_at: Utc::now(),
            },
        );
        if let Some(n_str) = account_number.rsplit('-').next() {
            if let Ok(n) = n_str.parse::<u64>() {
                let entry = inner.next_number_by_type.entry(account_type.to_string()).or_insert(FIRST_ACCOUNT_NUMBER);
                *entry = (*entry).max(n + 1);
            }
        }
    }

    pub fn open_account(&self, client_id: &str, account_type: &str) -> Result<AccountRecord, DuplicateAccount> {
        let mut inner = self.inner.lock();
        let has_type = inner
            .accounts_by_client
            .get(client_id)
            .map(|types| types.contains(account_type))
            .unwrap_or(false);
        if has_type {
            let existing = inner
                .accounts_by_number
                .values()
                .find(|a| a.client_id == client_id && a.account_type == account_type)
                .map(|a| a.account_number.clone())
                .unwrap_or_default();
            return Err(DuplicateAccount { existing_account_number: existing });
        }

        let counter = inner.next_number_by_type.entry(account_type.to_string()).or_insert(FIRST_ACCOUNT_NUMBER);
        let number = *counter;
        *counter += 1;

        let account_number = format!("{account_type}-{number}");
        let record = AccountRecord {
            account_number: account_number.clone(),
            account_type: account_type.to_string(),
            client_id: client_id.to_string(),
            status: "active".to_string(),
            created_at: Utc::now(),
        };
        inner.accounts_by_client.entry(client_id.to_string()).or_default().insert(account_type.to_string());
        inner.accounts_by_number.insert(account_number, record.clone());
        Ok(record)
    }

    pub fn get(&self, account_number: &str) -> Option<AccountRecord> {
        self.inner.lock().accounts_by_number.get(account_number).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_account_of_a_type_starts_at_1000() {
        let backend = AccountSystemBackend::new();
        let record = backend.open_account("C1", "ROTH_IRA").unwrap();
        assert_eq!(record.account_number, "ROTH_IRA-1000");
    }

    #[test]
    fn duplicate_account_type_is_rejected() {
        let backend = AccountSystemBackend::new();
        backend.open_account("C2", "ROTH_IRA").unwrap();
        let err = backend.open_account("C2", "ROTH_IRA").unwrap_err();
        assert_eq!(err.existing_account_number, "ROTH_IRA-1000");
    }

    #[test]
    fn different_types_do_not_collide() {
        let backend = AccountSystemBackend::new();
        let roth = backend.open_account("C3", "ROTH_IRA").unwrap();
        let brokerage = backend.open_account("C3", "BROKERAGE").unwrap();
        assert_ne!(roth.account_number, brokerage.account_number);
    }

    #[test]
    fn seeding_advances_the_counter_past_the_seed() {
        let backend = AccountSystemBackend::new();
        backend.seed_account("C2", "ROTH_IRA", "ROTH_IRA-1001");
        let err = backend.open_account("C2", "ROTH_IRA").unwrap_err();
        assert_eq!(err.existing_account_number, "ROTH_IRA-1001");

        let next = backend.open_account("C9", "ROTH_IRA").unwrap();
        assert_eq!(next.account_number, "ROTH_IRA-1002");
    }
}
