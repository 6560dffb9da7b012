//! Classification of client frames.
//!
//! Clients send free-form JSON objects with a `type` field. Most of them
//! are opaque application traffic the server relays without looking
//! inside; a few are host commands that change shared party state.

use std::sync::Arc;

use serde_json::Value;

use crate::{Codec, ProtocolError, RESERVED_TYPES};

/// Snapshot fields an option key may not shadow once flattened.
const SNAPSHOT_KEYS: [&str; 3] = ["type", "players", "partyCode"];

/// A request to change one selected option.
///
/// A `null` value clears the option.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionUpdate {
    pub key: String,
    pub value: Value,
}

/// A decoded client frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Host-only command. Sent by anyone else, it is ignored.
    UpdateOption(OptionUpdate),

    /// The client used a `type` only the server may send.
    Reserved(String),

    /// Application traffic. Holds the original bytes so the relay forwards
    /// exactly what the client sent.
    Relay(Arc<[u8]>),
}

impl Inbound {
    /// Decodes and classifies one client frame.
    ///
    /// Recognized host commands:
    ///
    /// | `type`         | fields         | option key      |
    /// |----------------|----------------|-----------------|
    /// | `updateOption` | `key`, `value` | `key`           |
    /// | `updateDeck`   | `deck`         | `selectedDeck`  |
    /// | `updateMode`   | `mode`         | `selectedMode`  |
    ///
    /// # Errors
    /// - [`ProtocolError::Decode`] if `data` is not JSON.
    /// - [`ProtocolError::InvalidMessage`] for an `updateOption` whose key
    ///   is missing or would collide with a snapshot field.
    pub fn classify(
        codec: &impl Codec,
        data: &[u8],
    ) -> Result<Self, ProtocolError> {
        let value: Value = codec.decode(data)?;
        let kind = value.get("type").and_then(Value::as_str);

        let inbound = match kind {
            Some("updateOption") => {
                let key = value
                    .get("key")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        ProtocolError::InvalidMessage(
                            "updateOption requires a string key".into(),
                        )
                    })?;
                if key.is_empty() || SNAPSHOT_KEYS.contains(&key) {
                    return Err(ProtocolError::InvalidMessage(format!(
                        "option key {key:?} is not allowed"
                    )));
                }
                Self::UpdateOption(OptionUpdate {
                    key: key.to_owned(),
                    value: field(&value, "value"),
                })
            }
            Some("updateDeck") => Self::UpdateOption(OptionUpdate {
                key: "selectedDeck".into(),
                value: field(&value, "deck"),
            }),
            Some("updateMode") => Self::UpdateOption(OptionUpdate {
                key: "selectedMode".into(),
                value: field(&value, "mode"),
            }),
            Some(reserved) if RESERVED_TYPES.contains(&reserved) => {
                Self::Reserved(reserved.to_owned())
            }
            _ => Self::Relay(Arc::from(data)),
        };
        Ok(inbound)
    }
}

fn field(value: &Value, name: &str) -> Value {
    value.get(name).cloned().unwrap_or(Value::Null)
}
