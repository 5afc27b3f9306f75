//! LINE webhook phone-verification gateway.
//!
//! Receives signed event callbacks, classifies freeform phone-number
//! messages against a persisted allow/deny registry, and sends at
//! most one reply per event while mutating registry state exactly
//! once per successful verification.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod notify;
pub mod signature;

pub use config::Config;
pub use error::GatewayError;
