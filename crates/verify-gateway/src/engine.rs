//! Verification state machine.
//!
//! Per-phone states: unknown, pending white, verified white, black.
//! The core drives exactly two transitions: unknown to verified white
//! (auto-registration on first contact) and pending white to verified
//! white (promotion). Black and verified white are terminal.

use phone_registry::{RegistryStore, UpsertOutcome, AUTO_LINE_SOURCE};
use std::sync::Arc;
use tracing::{debug, warn};

/// Fixed greeting for follow events. Stateless, no store interaction.
pub const FOLLOW_PROMPT: &str =
    "🎉 Welcome! Please enter your mobile number to verify (allowed once).";

pub const FORMAT_HINT: &str =
    "Please enter a valid mobile number (10 digits starting with 09).";

pub const FIRST_VERIFIED: &str =
    "✅ First-time verification succeeded, you have been added to the whitelist.";

pub const WELCOME_VERIFIED: &str = "✅ Verification succeeded, welcome!";

pub const ALREADY_VERIFIED: &str = "You are already verified.";

pub const STORE_BUSY: &str = "System busy, please try again later.";

/// Outcome of running one text event through the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// Input is not a well-formed phone number; the store was never
    /// consulted.
    FormatRejected,
    /// The verified flag was committed by this event. `first_contact`
    /// distinguishes auto-registration from promoting a seeded record.
    NewlyVerified { first_contact: bool },
    /// The number was verified before this event arrived.
    AlreadyVerified,
    /// Blacklisted numbers get no acknowledgment at all, so list
    /// membership cannot be probed.
    SilentDrop,
    /// The registry could not be reached; nothing was committed.
    StoreUnavailable,
}

impl VerificationOutcome {
    /// The reply to send for this outcome, if any.
    pub fn reply(&self) -> Option<&'static str> {
        match self {
            VerificationOutcome::FormatRejected => Some(FORMAT_HINT),
            VerificationOutcome::NewlyVerified { first_contact: true } => Some(FIRST_VERIFIED),
            VerificationOutcome::NewlyVerified { first_contact: false } => {
                Some(WELCOME_VERIFIED)
            }
            VerificationOutcome::AlreadyVerified => Some(ALREADY_VERIFIED),
            VerificationOutcome::SilentDrop => None,
            VerificationOutcome::StoreUnavailable => Some(STORE_BUSY),
        }
    }
}

/// The verification engine. Stateless itself; all shared state lives
/// behind the registry's atomic upsert.
pub struct VerificationEngine {
    registry: Arc<dyn RegistryStore>,
}

impl VerificationEngine {
    pub fn new(registry: Arc<dyn RegistryStore>) -> Self {
        Self { registry }
    }

    /// Valid iff exactly 10 characters starting with "09".
    fn valid_format(text: &str) -> bool {
        text.chars().count() == 10 && text.starts_with("09")
    }

    /// Run one inbound text through the decision procedure.
    pub async fn verify_text(&self, raw_text: &str) -> VerificationOutcome {
        let phone = raw_text.trim();

        if !Self::valid_format(phone) {
            debug!("Rejected input on format");
            return VerificationOutcome::FormatRejected;
        }

        match self.registry.upsert_verification(phone, AUTO_LINE_SOURCE).await {
            Ok(UpsertOutcome::Inserted) => VerificationOutcome::NewlyVerified {
                first_contact: true,
            },
            Ok(UpsertOutcome::Promoted) => VerificationOutcome::NewlyVerified {
                first_contact: false,
            },
            Ok(UpsertOutcome::AlreadyVerified) => VerificationOutcome::AlreadyVerified,
            Ok(UpsertOutcome::Blacklisted) => {
                debug!(phone, "Dropping text from blacklisted number");
                VerificationOutcome::SilentDrop
            }
            Err(e) => {
                warn!("Registry unavailable: {}", e);
                VerificationOutcome::StoreUnavailable
            }
        }
    }
}
