//! In-memory registry backend.
//!
//! Used by tests and local development. A single write lock spans the
//! whole conditional upsert, which gives the same per-phone atomicity
//! the Postgres backend gets from single-row guarded statements.

use crate::error::RegistryError;
use crate::types::{ListStatus, PhoneRecord, UpsertOutcome};
use crate::RegistryStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory phone registry.
#[derive(Clone, Default)]
pub struct MemoryRegistry {
    records: Arc<RwLock<HashMap<String, PhoneRecord>>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly, standing in for the external bulk import.
    pub async fn seed(&self, record: PhoneRecord) {
        let mut records = self.records.write().await;
        records.insert(record.phone.clone(), record);
    }

    /// Number of records held.
    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl RegistryStore for MemoryRegistry {
    async fn lookup(&self, phone: &str) -> Result<Option<PhoneRecord>, RegistryError> {
        let records = self.records.read().await;
        Ok(records.get(phone).cloned())
    }

    async fn upsert_verification(
        &self,
        phone: &str,
        source: &str,
    ) -> Result<UpsertOutcome, RegistryError> {
        let mut records = self.records.write().await;

        match records.get_mut(phone) {
            None => {
                records.insert(
                    phone.to_string(),
                    PhoneRecord::auto_registered(phone, source),
                );
                debug!(phone, "Auto-registered new record");
                Ok(UpsertOutcome::Inserted)
            }
            Some(record) if record.status == ListStatus::Black => Ok(UpsertOutcome::Blacklisted),
            Some(record) if record.verified => Ok(UpsertOutcome::AlreadyVerified),
            Some(record) => {
                record.verified = true;
                debug!(phone, "Promoted pending record to verified");
                Ok(UpsertOutcome::Promoted)
            }
        }
    }

    async fn healthy(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_inserts_when_absent() {
        let registry = MemoryRegistry::new();

        let outcome = registry
            .upsert_verification("0912345678", "auto-line")
            .await
            .unwrap();
        assert_eq!(outcome, UpsertOutcome::Inserted);

        let record = registry.lookup("0912345678").await.unwrap().unwrap();
        assert_eq!(record.status, ListStatus::White);
        assert!(record.verified);
        assert_eq!(record.source, "auto-line");
    }

    #[tokio::test]
    async fn test_upsert_promotes_pending_white() {
        let registry = MemoryRegistry::new();
        registry
            .seed(PhoneRecord::seeded("0911111111", ListStatus::White, "import"))
            .await;

        let outcome = registry
            .upsert_verification("0911111111", "auto-line")
            .await
            .unwrap();
        assert_eq!(outcome, UpsertOutcome::Promoted);

        // Seeded provenance is kept; only the verified flag flips
        let record = registry.lookup("0911111111").await.unwrap().unwrap();
        assert!(record.verified);
        assert_eq!(record.source, "import");
    }

    #[tokio::test]
    async fn test_upsert_noop_when_already_verified() {
        let registry = MemoryRegistry::new();

        registry
            .upsert_verification("0912345678", "auto-line")
            .await
            .unwrap();
        let outcome = registry
            .upsert_verification("0912345678", "auto-line")
            .await
            .unwrap();

        assert_eq!(outcome, UpsertOutcome::AlreadyVerified);
        assert_eq!(registry.count().await, 1);
    }

    #[tokio::test]
    async fn test_upsert_noop_when_blacklisted() {
        let registry = MemoryRegistry::new();
        registry
            .seed(PhoneRecord::seeded("0900000000", ListStatus::Black, "import"))
            .await;

        let outcome = registry
            .upsert_verification("0900000000", "auto-line")
            .await
            .unwrap();
        assert_eq!(outcome, UpsertOutcome::Blacklisted);

        let record = registry.lookup("0900000000").await.unwrap().unwrap();
        assert!(!record.verified);
        assert_eq!(record.status, ListStatus::Black);
    }

    #[tokio::test]
    async fn test_concurrent_first_contact_inserts_once() {
        let registry = MemoryRegistry::new();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                registry.upsert_verification("0912345678", "auto-line").await
            }));
        }

        let mut inserted = 0;
        for handle in handles {
            match handle.await.unwrap().unwrap() {
                UpsertOutcome::Inserted => inserted += 1,
                UpsertOutcome::AlreadyVerified => {}
                other => panic!("unexpected outcome: {:?}", other),
            }
        }

        assert_eq!(inserted, 1);
        assert_eq!(registry.count().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_promotion_applies_once() {
        let registry = MemoryRegistry::new();
        registry
            .seed(PhoneRecord::seeded("0911111111", ListStatus::White, "import"))
            .await;

        let mut handles = Vec::new();
        for _ in 0..16 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                registry.upsert_verification("0911111111", "auto-line").await
            }));
        }

        let mut promoted = 0;
        for handle in handles {
            match handle.await.unwrap().unwrap() {
                UpsertOutcome::Promoted => promoted += 1,
                UpsertOutcome::AlreadyVerified => {}
                other => panic!("unexpected outcome: {:?}", other),
            }
        }

        assert_eq!(promoted, 1);
    }
}
