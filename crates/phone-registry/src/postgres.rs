//! PostgreSQL registry backend.
//!
//! The verification upsert is split into two guarded single-row
//! statements, each atomic on its own:
//!
//! 1. `INSERT ... ON CONFLICT (phone) DO NOTHING`, where an
//!    affected-row count of 1 means this caller created the record.
//! 2. `UPDATE ... SET verified = TRUE WHERE status = 'white' AND
//!    verified = FALSE`, where an affected-row count of 1 means this
//!    caller flipped the pending record.
//!
//! At most one caller system-wide can win each branch for a given
//! phone, so at most one `Inserted`/`Promoted` outcome ever exists per
//! number. When both branches miss, the record is in a terminal state
//! (already verified, or blacklisted) and a plain read classifies it.
//!
//! Every statement runs under a bounded timeout. The pool's acquire
//! timeout covers getting a connection; the query timeout covers
//! execution on a connection that stalls mid-flight. Both expiries
//! surface as `RegistryError::Unavailable`.

use crate::error::RegistryError;
use crate::types::{ListStatus, PhoneRecord, UpsertOutcome};
use crate::RegistryStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Run a store operation under a deadline, mapping expiry to
/// `Unavailable` so callers treat a hung database like a down one.
async fn timed<T>(
    limit: Duration,
    op: impl Future<Output = Result<T, sqlx::Error>>,
) -> Result<T, RegistryError> {
    match tokio::time::timeout(limit, op).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(RegistryError::Unavailable(format!(
            "query timed out after {limit:?}"
        ))),
    }
}

/// PostgreSQL-backed phone registry.
#[derive(Clone)]
pub struct PgRegistry {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgRegistry {
    /// Connect to the database and ensure the schema exists.
    pub async fn connect(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
        query_timeout: Duration,
    ) -> Result<Self, RegistryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await?;

        let registry = Self {
            pool,
            query_timeout,
        };
        registry.run_migrations().await?;
        info!("Phone registry connected (max_connections={})", max_connections);
        Ok(registry)
    }

    async fn run_migrations(&self) -> Result<(), RegistryError> {
        timed(
            self.query_timeout,
            sqlx::query(
                "CREATE TABLE IF NOT EXISTS phone_records (
                    phone      TEXT PRIMARY KEY,
                    status     TEXT NOT NULL,
                    verified   BOOLEAN NOT NULL DEFAULT FALSE,
                    source     TEXT NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )",
            )
            .execute(&self.pool),
        )
        .await?;

        Ok(())
    }

    fn row_to_record(row: &PgRow) -> Result<PhoneRecord, RegistryError> {
        let status: String = row.get("status");
        let status = ListStatus::parse(&status)
            .ok_or_else(|| RegistryError::Storage(format!("unknown status: {status}")))?;
        let created_at: DateTime<Utc> = row.get("created_at");

        Ok(PhoneRecord {
            phone: row.get("phone"),
            status,
            verified: row.get("verified"),
            source: row.get("source"),
            created_at,
        })
    }
}

#[async_trait]
impl RegistryStore for PgRegistry {
    async fn lookup(&self, phone: &str) -> Result<Option<PhoneRecord>, RegistryError> {
        let row = timed(
            self.query_timeout,
            sqlx::query(
                "SELECT phone, status, verified, source, created_at
                 FROM phone_records WHERE phone = $1",
            )
            .bind(phone)
            .fetch_optional(&self.pool),
        )
        .await?;

        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn upsert_verification(
        &self,
        phone: &str,
        source: &str,
    ) -> Result<UpsertOutcome, RegistryError> {
        // Branch 1: first contact, auto-register as verified whitelist
        let inserted = timed(
            self.query_timeout,
            sqlx::query(
                "INSERT INTO phone_records (phone, status, verified, source, created_at)
                 VALUES ($1, 'white', TRUE, $2, NOW())
                 ON CONFLICT (phone) DO NOTHING",
            )
            .bind(phone)
            .bind(source)
            .execute(&self.pool),
        )
        .await?;

        if inserted.rows_affected() == 1 {
            debug!(phone, "Auto-registered new record");
            return Ok(UpsertOutcome::Inserted);
        }

        // Branch 2: pending white record, flip the verified flag
        let promoted = timed(
            self.query_timeout,
            sqlx::query(
                "UPDATE phone_records SET verified = TRUE
                 WHERE phone = $1 AND status = 'white' AND verified = FALSE",
            )
            .bind(phone)
            .execute(&self.pool),
        )
        .await?;

        if promoted.rows_affected() == 1 {
            debug!(phone, "Promoted pending record to verified");
            return Ok(UpsertOutcome::Promoted);
        }

        // Both branches missed: the record is in a terminal state.
        // Terminal states never change, so this read races with nothing.
        match self.lookup(phone).await? {
            Some(record) if record.status == ListStatus::Black => Ok(UpsertOutcome::Blacklisted),
            Some(_) => Ok(UpsertOutcome::AlreadyVerified),
            None => {
                // Records are never deleted; reaching here means the
                // store is lying to us.
                warn!(phone, "Record vanished between upsert and classify");
                Err(RegistryError::Storage("record vanished during upsert".into()))
            }
        }
    }

    async fn healthy(&self) -> bool {
        timed(self.query_timeout, sqlx::query("SELECT 1").execute(&self.pool))
            .await
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_timed_maps_expiry_to_unavailable() {
        let result: Result<(), RegistryError> =
            timed(Duration::from_millis(10), std::future::pending()).await;

        assert!(matches!(result, Err(RegistryError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_timed_passes_through_completed_ops() {
        let ok: Result<u64, RegistryError> =
            timed(Duration::from_secs(1), async { Ok(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let err: Result<u64, RegistryError> = timed(Duration::from_secs(1), async {
            Err(sqlx::Error::PoolTimedOut)
        })
        .await;
        assert!(matches!(err, Err(RegistryError::Unavailable(_))));
    }
}
