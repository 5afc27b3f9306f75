//! Phone number allow/deny registry.
//!
//! The registry is the only shared mutable state in the gateway. All
//! coordination between concurrent webhook deliveries is pushed into
//! `upsert_verification`, a conditional upsert that is atomic per
//! phone number: for any given number, at most one caller ever
//! observes `Inserted` and at most one ever observes `Promoted`.

mod error;
mod memory;
mod postgres;
mod types;

pub use error::RegistryError;
pub use memory::MemoryRegistry;
pub use postgres::PgRegistry;
pub use types::*;

use async_trait::async_trait;

/// Keyed record store over phone numbers.
#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// Fetch the record for a phone number, if any.
    async fn lookup(&self, phone: &str) -> Result<Option<PhoneRecord>, RegistryError>;

    /// Atomic conditional upsert: insert a verified auto-registered
    /// whitelist record if the phone is unknown, flip `verified` on an
    /// existing unverified white record, or report the terminal state
    /// (already verified / blacklisted) without touching anything.
    async fn upsert_verification(
        &self,
        phone: &str,
        source: &str,
    ) -> Result<UpsertOutcome, RegistryError>;

    /// Liveness probe.
    async fn healthy(&self) -> bool;
}
