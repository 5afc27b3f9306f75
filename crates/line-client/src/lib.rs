//! LINE Messaging API client.

mod client;
mod error;
mod types;

pub use client::LineClient;
pub use error::LineError;
pub use types::*;
