//! LINE Messaging API HTTP client.

use crate::error::LineError;
use crate::types::*;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// LINE Messaging API client.
///
/// Sends at most one message per call. A reply consumes the one-shot
/// reply token of the inbound event; a push is uncorrelated and works
/// for any known recipient id.
#[derive(Clone)]
pub struct LineClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl LineClient {
    /// Create a new LINE client with a bounded request timeout.
    pub fn new(
        base_url: impl Into<String>,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LineError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            access_token: access_token.into(),
        })
    }

    /// Reply to an inbound event using its reply token. The token is
    /// usable exactly once.
    #[instrument(skip(self, message))]
    pub async fn reply(&self, reply_token: &str, message: &str) -> Result<(), LineError> {
        let request = ReplyRequest {
            reply_token: reply_token.to_string(),
            messages: vec![TextMessage::new(message)],
        };

        let response = self
            .client
            .post(format!("{}/v2/bot/message/reply", self.base_url))
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let msg = response.text().await.unwrap_or_default();
            warn!("Reply failed: {}", msg);
            return Err(LineError::SendFailed(msg));
        }

        debug!("Replied to event");
        Ok(())
    }

    /// Push a message to a recipient id.
    #[instrument(skip(self, message))]
    pub async fn push(&self, to: &str, message: &str) -> Result<(), LineError> {
        let request = PushRequest {
            to: to.to_string(),
            messages: vec![TextMessage::new(message)],
        };

        let response = self
            .client
            .post(format!("{}/v2/bot/message/push", self.base_url))
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let msg = response.text().await.unwrap_or_default();
            warn!("Push failed: {}", msg);
            return Err(LineError::SendFailed(msg));
        }

        debug!("Pushed message to {}", to);
        Ok(())
    }
}
