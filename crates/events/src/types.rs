//! Message envelope exchanged between the host and the overlay

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EventsError;

/// Envelope wrapping every message the host posts into the web view.
///
/// `event_type` is the routing tag; `data` is whatever the tag's
/// subscribers expect. The channel itself carries `NuiMessage<Value>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct NuiMessage<T> {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: T,
}

impl<T> NuiMessage<T> {
    pub fn new(event_type: impl Into<String>, data: T) -> Self {
        Self {
            event_type: event_type.into(),
            data,
        }
    }
}

impl NuiMessage<Value> {
    /// Parse an envelope from the raw JSON text the host delivers.
    ///
    /// A missing `data` field becomes `null`. Anything without a string
    /// `type` is rejected.
    pub fn from_json(raw: &str) -> Result<Self, EventsError> {
        let raw: RawEnvelope =
            serde_json::from_str(raw).map_err(|e| EventsError::InvalidEnvelope(e.to_string()))?;
        Ok(Self {
            event_type: raw.event_type,
            data: raw.data,
        })
    }
}

#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    data: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_serialization() {
        let message = NuiMessage::new("scratchcard:init", json!({"serial": "ABC123"}));
        let json = serde_json::to_string(&message).unwrap();

        assert!(json.contains("\"type\":\"scratchcard:init\""));
        assert!(json.contains("\"data\":{\"serial\":\"ABC123\"}"));
    }

    #[test]
    fn test_from_json() {
        let raw = r#"{"type":"scratchcard:init","data":{"serial":"ABC123","scratched":false}}"#;
        let message = NuiMessage::from_json(raw).unwrap();

        assert_eq!(message.event_type, "scratchcard:init");
        assert_eq!(message.data["serial"], "ABC123");
    }

    #[test]
    fn test_from_json_missing_data_is_null() {
        let message = NuiMessage::from_json(r#"{"type":"scratchcard:close"}"#).unwrap();

        assert_eq!(message.event_type, "scratchcard:close");
        assert!(message.data.is_null());
    }

    #[test]
    fn test_from_json_missing_type() {
        let result = NuiMessage::from_json(r#"{"data":{"serial":"ABC123"}}"#);
        assert!(matches!(result, Err(EventsError::InvalidEnvelope(_))));
    }

    #[test]
    fn test_from_json_not_json() {
        let result = NuiMessage::from_json("setVisible true");
        assert!(matches!(result, Err(EventsError::InvalidEnvelope(_))));
    }

    #[test]
    fn test_typed_message_deserialization() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Visibility {
            visible: bool,
        }

        let message: NuiMessage<Visibility> =
            serde_json::from_str(r#"{"type":"setVisible","data":{"visible":true}}"#).unwrap();
        assert_eq!(message.data, Visibility { visible: true });
    }
}
