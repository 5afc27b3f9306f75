//! Webhook envelope parsing.
//!
//! One delivery may batch several events. Event `type` is a free-form
//! string on the wire: shapes this service does not understand map to
//! `InboundEvent::Unrecognized` and are skipped downstream, so the
//! platform can add event types without breaking us. Only a malformed
//! envelope itself is a parse failure.

use serde::Deserialize;

/// Raw webhook envelope as delivered by the platform.
#[derive(Debug, Deserialize)]
pub struct WebhookEnvelope {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<RawEvent>,
}

/// One raw event, permissive over unknown shapes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub source: Option<EventSource>,
    #[serde(default)]
    pub message: Option<RawMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// A typed inbound event. Closed sum: the dispatcher matches
/// exhaustively, so a new variant is a compile-time-checked extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Followed {
        user_id: String,
        reply_token: Option<String>,
    },
    TextReceived {
        user_id: String,
        text: String,
        reply_token: Option<String>,
    },
    Unrecognized,
}

impl RawEvent {
    fn into_event(self) -> InboundEvent {
        let RawEvent {
            event_type,
            reply_token,
            source,
            message,
        } = self;

        let Some(user_id) = source.and_then(|s| s.user_id) else {
            return InboundEvent::Unrecognized;
        };

        match event_type.as_str() {
            "follow" => InboundEvent::Followed {
                user_id,
                reply_token,
            },
            "message" => match message {
                Some(m) if m.message_type == "text" => match m.text {
                    Some(text) => InboundEvent::TextReceived {
                        user_id,
                        text,
                        reply_token,
                    },
                    None => InboundEvent::Unrecognized,
                },
                // Stickers, images, etc.
                _ => InboundEvent::Unrecognized,
            },
            _ => InboundEvent::Unrecognized,
        }
    }
}

/// Parse a raw delivery body into its events, in payload order.
pub fn parse(body: &[u8]) -> Result<impl Iterator<Item = InboundEvent>, serde_json::Error> {
    let envelope: WebhookEnvelope = serde_json::from_slice(body)?;
    Ok(envelope.events.into_iter().map(RawEvent::into_event))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_message_event() {
        let body = br#"{
            "destination": "Ubot",
            "events": [{
                "type": "message",
                "replyToken": "rt-1",
                "source": {"type": "user", "userId": "U123"},
                "message": {"id": "42", "type": "text", "text": "0912345678"}
            }]
        }"#;

        let events: Vec<_> = parse(body).unwrap().collect();
        assert_eq!(
            events,
            vec![InboundEvent::TextReceived {
                user_id: "U123".into(),
                text: "0912345678".into(),
                reply_token: Some("rt-1".into()),
            }]
        );
    }

    #[test]
    fn test_parse_follow_event() {
        let body = br#"{
            "events": [{
                "type": "follow",
                "replyToken": "rt-2",
                "source": {"type": "user", "userId": "U456"}
            }]
        }"#;

        let events: Vec<_> = parse(body).unwrap().collect();
        assert_eq!(
            events,
            vec![InboundEvent::Followed {
                user_id: "U456".into(),
                reply_token: Some("rt-2".into()),
            }]
        );
    }

    #[test]
    fn test_parse_batched_delivery_keeps_order() {
        let body = br#"{
            "events": [
                {"type": "follow", "source": {"userId": "U1"}},
                {"type": "message", "source": {"userId": "U2"},
                 "message": {"type": "text", "text": "hi"}}
            ]
        }"#;

        let events: Vec<_> = parse(body).unwrap().collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], InboundEvent::Followed { .. }));
        assert!(matches!(events[1], InboundEvent::TextReceived { .. }));
    }

    #[test]
    fn test_unknown_event_type_is_unrecognized() {
        let body = br#"{
            "events": [{
                "type": "memberJoined",
                "source": {"userId": "U1"}
            }]
        }"#;

        let events: Vec<_> = parse(body).unwrap().collect();
        assert_eq!(events, vec![InboundEvent::Unrecognized]);
    }

    #[test]
    fn test_non_text_message_is_unrecognized() {
        let body = br#"{
            "events": [{
                "type": "message",
                "source": {"userId": "U1"},
                "message": {"id": "7", "type": "sticker"}
            }]
        }"#;

        let events: Vec<_> = parse(body).unwrap().collect();
        assert_eq!(events, vec![InboundEvent::Unrecognized]);
    }

    #[test]
    fn test_missing_user_id_is_unrecognized() {
        let body = br#"{
            "events": [{
                "type": "message",
                "message": {"type": "text", "text": "hello"}
            }]
        }"#;

        let events: Vec<_> = parse(body).unwrap().collect();
        assert_eq!(events, vec![InboundEvent::Unrecognized]);
    }

    #[test]
    fn test_empty_delivery() {
        let body = br#"{"destination": "Ubot", "events": []}"#;
        assert_eq!(parse(body).unwrap().count(), 0);
    }

    #[test]
    fn test_malformed_envelope_is_parse_failure() {
        assert!(parse(b"not json").is_err());
        assert!(parse(br#"{"events": "nope"}"#).is_err());
    }
}
