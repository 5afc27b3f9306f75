//! LINE Messaging API request types.

use serde::Serialize;

/// A single text message in an outgoing request.
#[derive(Debug, Clone, Serialize)]
pub struct TextMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    pub text: String,
}

impl TextMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            message_type: "text".into(),
            text: text.into(),
        }
    }
}

/// Reply request, correlated to an inbound event via its reply token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    pub reply_token: String,
    pub messages: Vec<TextMessage>,
}

/// Push request to a known recipient id.
#[derive(Debug, Clone, Serialize)]
pub struct PushRequest {
    pub to: String,
    pub messages: Vec<TextMessage>,
}
