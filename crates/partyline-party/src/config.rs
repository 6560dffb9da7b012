//! Party configuration.

use serde::{Deserialize, Serialize};

/// Who receives a relayed application message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum RelayMode {
    /// Every member, the sender included. Clients render their own
    /// messages from the echo.
    #[default]
    All,

    /// Every member except the sender.
    AllExceptSender,
}

/// Settings shared by every party in a registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PartyConfig {
    /// Maximum members per party.
    pub max_members: usize,

    /// Delivery mode for relayed application messages.
    pub relay_mode: RelayMode,
}

impl Default for PartyConfig {
    fn default() -> Self {
        Self {
            max_members: 8,
            relay_mode: RelayMode::All,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_party_config_default() {
        let config = PartyConfig::default();
        assert_eq!(config.max_members, 8);
        assert_eq!(config.relay_mode, RelayMode::All);
    }

    #[test]
    fn test_party_config_fills_missing_fields_from_default() {
        let config: PartyConfig =
            serde_json::from_str(r#"{ "relay_mode": "allExceptSender" }"#)
                .unwrap();
        assert_eq!(config.max_members, 8);
        assert_eq!(config.relay_mode, RelayMode::AllExceptSender);
    }
}
