//! Best-effort outbound notification.
//!
//! The registry commit is the source of truth; a failed send has no
//! compensating action (there is no way to un-verify a number), so
//! notify failures are logged and swallowed, never retried here.

use line_client::LineClient;
use tracing::warn;

/// Sends at most one message per event outcome.
pub struct Notifier {
    line: LineClient,
}

impl Notifier {
    pub fn new(line: LineClient) -> Self {
        Self { line }
    }

    /// Deliver one message. Prefers the event's one-shot reply token;
    /// falls back to a push when the platform supplied none.
    pub async fn deliver(&self, reply_token: Option<&str>, user_id: &str, text: &str) {
        let result = match reply_token {
            Some(token) => self.line.reply(token, text).await,
            None => self.line.push(user_id, text).await,
        };

        if let Err(e) = result {
            warn!(user_id = %user_id, "Notify failed: {}", e);
        }
    }
}
