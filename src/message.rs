// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;
use serde_json::Value;

use crate::error::ClientError;

/// One message delivered by a statuses stream.
///
/// Tweets and the less common notices are kept as raw JSON. Only the notices a
/// consumer typically acts on (limits, disconnects, stall warnings) are decoded.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamingMessage {
    Tweet(Value),
    StatusDeletion(Value),
    LocationDeletion(Value),
    LimitNotice(LimitNotice),
    StatusWithheld(Value),
    UserWithheld(Value),
    Disconnect(DisconnectMessage),
    StallWarning(StallWarning),
    Unknown(Value),
}

/// Matching tweets that were not delivered because of rate limiting.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LimitNotice {
    pub track: u64,
    #[serde(default)]
    pub timestamp_ms: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct DisconnectMessage {
    pub code: u32,
    pub stream_name: Option<String>,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct StallWarning {
    pub code: String,
    pub message: String,
    pub percent_full: Option<u8>,
}

impl StreamingMessage {
    /// Decode a single non-blank line of a stream body.
    pub fn from_line(line: &str) -> Result<Self, ClientError> {
        Self::from_slice(line.as_bytes())
    }

    /// Like [`from_line`](Self::from_line), for raw body bytes. Invalid UTF-8 is a decode error.
    pub fn from_slice(line: &[u8]) -> Result<Self, ClientError> {
        let value: Value = serde_json::from_slice(line)?;
        Self::from_value(value)
    }

    pub fn from_value(mut value: Value) -> Result<Self, ClientError> {
        let Some(object) = value.as_object_mut() else {
            return Ok(Self::Unknown(value));
        };

        if let Some(inner) = object.remove("delete") {
            return Ok(Self::StatusDeletion(inner));
        }
        if let Some(inner) = object.remove("scrub_geo") {
            return Ok(Self::LocationDeletion(inner));
        }
        if let Some(inner) = object.remove("limit") {
            return Ok(Self::LimitNotice(serde_json::from_value(inner)?));
        }
        if let Some(inner) = object.remove("status_withheld") {
            return Ok(Self::StatusWithheld(inner));
        }
        if let Some(inner) = object.remove("user_withheld") {
            return Ok(Self::UserWithheld(inner));
        }
        if let Some(inner) = object.remove("disconnect") {
            return Ok(Self::Disconnect(serde_json::from_value(inner)?));
        }
        if let Some(inner) = object.remove("warning") {
            return Ok(Self::StallWarning(serde_json::from_value(inner)?));
        }
        if object.contains_key("id_str") {
            return Ok(Self::Tweet(value));
        }

        Ok(Self::Unknown(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tweet_keeps_full_payload() {
        let line = r#"{"id":1,"id_str":"1","text":"hello"}"#;
        let message = StreamingMessage::from_line(line).unwrap();
        assert_eq!(
            message,
            StreamingMessage::Tweet(json!({"id": 1, "id_str": "1", "text": "hello"}))
        );
    }

    #[test]
    fn notices_are_decoded() {
        let limit = StreamingMessage::from_line(r#"{"limit":{"track":1234}}"#).unwrap();
        assert_eq!(
            limit,
            StreamingMessage::LimitNotice(LimitNotice {
                track: 1234,
                timestamp_ms: None
            })
        );

        let disconnect = StreamingMessage::from_line(
            r#"{"disconnect":{"code":4,"stream_name":"sample","reason":"duplicate stream"}}"#,
        )
        .unwrap();
        assert!(matches!(
            disconnect,
            StreamingMessage::Disconnect(DisconnectMessage { code: 4, .. })
        ));

        let warning = StreamingMessage::from_line(
            r#"{"warning":{"code":"FALLING_BEHIND","message":"slow","percent_full":60}}"#,
        )
        .unwrap();
        assert!(matches!(
            warning,
            StreamingMessage::StallWarning(StallWarning {
                percent_full: Some(60),
                ..
            })
        ));
    }

    #[test]
    fn deletion_unwraps_inner_object() {
        let message = StreamingMessage::from_line(
            r#"{"delete":{"status":{"id":5,"id_str":"5","user_id":7,"user_id_str":"7"}}}"#,
        )
        .unwrap();
        match message {
            StreamingMessage::StatusDeletion(inner) => assert_eq!(inner["status"]["id"], 5),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn unrecognised_json_is_unknown() {
        assert_eq!(
            StreamingMessage::from_line(r#"{"friends":[1,2]}"#).unwrap(),
            StreamingMessage::Unknown(json!({"friends": [1, 2]}))
        );
        assert_eq!(
            StreamingMessage::from_line("42").unwrap(),
            StreamingMessage::Unknown(json!(42))
        );
    }

    #[test]
    fn malformed_line_is_a_decode_error() {
        assert!(matches!(
            StreamingMessage::from_line("{\"id_str\":"),
            Err(ClientError::DecodeError(_))
        ));
    }
}
