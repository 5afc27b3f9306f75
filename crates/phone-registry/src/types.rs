//! Registry record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provenance tag for numbers that register themselves via LINE.
pub const AUTO_LINE_SOURCE: &str = "auto-line";

/// Allow/deny classification for a phone number.
///
/// Set at creation and only ever changed by an administrative process
/// outside this service; the core never flips white to black or back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStatus {
    White,
    Black,
}

impl ListStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListStatus::White => "white",
            ListStatus::Black => "black",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "white" => Some(ListStatus::White),
            "black" => Some(ListStatus::Black),
            _ => None,
        }
    }
}

/// A persisted phone number record.
///
/// At most one record exists per phone. Once `verified` is true the
/// record is terminal for this service; records are never deleted here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhoneRecord {
    /// The phone number (10 characters), primary key.
    pub phone: String,

    /// Allow/deny classification.
    pub status: ListStatus,

    /// Whether the number has completed verification. Monotonic:
    /// transitions false to true and never reverts.
    pub verified: bool,

    /// Provenance tag ("auto-line" for self-registered numbers).
    pub source: String,

    /// When the record was inserted.
    pub created_at: DateTime<Utc>,
}

impl PhoneRecord {
    /// Create an auto-registered record: whitelisted and verified at birth.
    pub fn auto_registered(phone: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            status: ListStatus::White,
            verified: true,
            source: source.into(),
            created_at: Utc::now(),
        }
    }

    /// Create an administratively seeded record, initially unverified.
    pub fn seeded(phone: impl Into<String>, status: ListStatus, source: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            status,
            verified: false,
            source: source.into(),
            created_at: Utc::now(),
        }
    }
}

/// Result of the atomic conditional verification upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No record existed; a verified whitelist record was inserted.
    Inserted,
    /// A pending white record existed; its verified flag was flipped.
    Promoted,
    /// The record was already verified; nothing changed.
    AlreadyVerified,
    /// The record is blacklisted; nothing changed.
    Blacklisted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        assert_eq!(ListStatus::parse("white"), Some(ListStatus::White));
        assert_eq!(ListStatus::parse("black"), Some(ListStatus::Black));
        assert_eq!(ListStatus::parse("gray"), None);
        assert_eq!(ListStatus::White.as_str(), "white");
        assert_eq!(ListStatus::Black.as_str(), "black");
    }

    #[test]
    fn test_auto_registered_record() {
        let record = PhoneRecord::auto_registered("0912345678", AUTO_LINE_SOURCE);
        assert_eq!(record.status, ListStatus::White);
        assert!(record.verified);
        assert_eq!(record.source, "auto-line");
    }

    #[test]
    fn test_seeded_record_starts_unverified() {
        let record = PhoneRecord::seeded("0900000000", ListStatus::Black, "import");
        assert_eq!(record.status, ListStatus::Black);
        assert!(!record.verified);
    }

    #[test]
    fn test_record_serialization() {
        let record = PhoneRecord::auto_registered("0912345678", AUTO_LINE_SOURCE);
        let json = serde_json::to_string(&record).unwrap();

        assert!(json.contains("\"phone\":\"0912345678\""));
        assert!(json.contains("\"status\":\"white\""));
        assert!(json.contains("\"verified\":true"));
    }
}
