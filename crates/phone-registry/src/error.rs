//! Registry errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    /// The store could not be reached (connection, pool or timeout
    /// failure). Callers must not assume any partial write occurred.
    #[error("Registry unavailable: {0}")]
    Unavailable(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for RegistryError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => RegistryError::Unavailable(e.to_string()),
            other => RegistryError::Storage(other.to_string()),
        }
    }
}
