//! Core protocol types for Partyline's wire format.
//!
//! Everything in here is a record the server writes onto the wire. Clients
//! are browsers speaking JSON, so field names are camelCase and every
//! server message carries a `type` discriminator.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// PartyCode
// ---------------------------------------------------------------------------

/// The short code that identifies a live party, e.g. `"QXBE"`.
///
/// A newtype over `String` so that only well-formed codes (exactly
/// [`PartyCode::LEN`] characters from [`PartyCode::ALPHABET`]) can exist.
/// Build one with [`str::parse`] for client input or
/// [`PartyCode::generate`] for a fresh random code.
///
/// `#[serde(try_from = "String")]` routes deserialization through the same
/// validation as `parse`, so a malformed code never slips in through JSON.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct PartyCode(String);

impl PartyCode {
    /// Number of characters in every party code.
    pub const LEN: usize = 4;

    /// Characters a party code is drawn from.
    pub const ALPHABET: &'static [u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

    /// Draws a random code. Uniqueness is the registry's job.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..Self::LEN)
            .map(|_| {
                let idx = rng.random_range(0..Self::ALPHABET.len());
                Self::ALPHABET[idx] as char
            })
            .collect();
        Self(code)
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PartyCode {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let well_formed = s.len() == Self::LEN
            && s.bytes().all(|b| Self::ALPHABET.contains(&b));
        if well_formed {
            Ok(Self(s.to_owned()))
        } else {
            Err(ProtocolError::InvalidPartyCode(s.to_owned()))
        }
    }
}

impl TryFrom<String> for PartyCode {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PartyCode> for String {
    fn from(code: PartyCode) -> Self {
        code.0
    }
}

/// Lets a `HashMap<PartyCode, _>` be queried with raw client input.
impl Borrow<str> for PartyCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Snapshot pieces
// ---------------------------------------------------------------------------

/// Host-controlled settings shared by a party, e.g. `selectedDeck`.
///
/// Values are arbitrary JSON because the server never interprets them; it
/// stores what the host sent and echoes it in every snapshot. A `BTreeMap`
/// keeps snapshot output deterministic.
pub type SelectedOptions = BTreeMap<String, serde_json::Value>;

/// One row of the player list inside a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerEntry {
    /// Display name as the player typed it.
    pub name: String,
    /// Whether this player is the party host.
    pub is_host: bool,
}

// ---------------------------------------------------------------------------
// ServerMessage
// ---------------------------------------------------------------------------

/// `type` values that only the server may send. Client frames using one of
/// these are dropped rather than relayed.
pub const RESERVED_TYPES: [&str; 3] = ["error", "playerList", "newHost"];

/// Messages the server itself originates.
///
/// `#[serde(tag = "type")]` produces the flat shape clients expect:
/// `{ "type": "newHost", "hostName": "Bea" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Join rejected. Sent once, then the server closes the connection.
    Error { message: String },

    /// The canonical party snapshot. Clients replace their whole view with
    /// it; it is never a diff.
    ///
    /// Selected options are flattened onto the record, so a party with a
    /// chosen deck serializes as `{ ..., "selectedDeck": "classic" }`.
    #[serde(rename_all = "camelCase")]
    PlayerList {
        players: Vec<PlayerEntry>,
        party_code: PartyCode,
        #[serde(flatten)]
        selected_options: SelectedOptions,
    },

    /// The previous host left and `host_name` took over.
    #[serde(rename_all = "camelCase")]
    NewHost { host_name: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;

    #[test]
    fn test_party_code_parse_accepts_four_uppercase_letters() {
        let code: PartyCode = "QXBE".parse().unwrap();
        assert_eq!(code.as_str(), "QXBE");
        assert_eq!(code.to_string(), "QXBE");
    }

    #[test]
    fn test_party_code_parse_rejects_malformed_codes() {
        for bad in ["", "ABC", "ABCDE", "abcd", "AB1D", "ÄBCD"] {
            assert!(
                matches!(
                    bad.parse::<PartyCode>(),
                    Err(ProtocolError::InvalidPartyCode(_))
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_party_code_generate_is_well_formed() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let code = PartyCode::generate(&mut rng);
            assert!(code.as_str().parse::<PartyCode>().is_ok(), "{code}");
        }
    }

    #[test]
    fn test_party_code_deserialize_validates() {
        assert!(serde_json::from_value::<PartyCode>(json!("WXYZ")).is_ok());
        assert!(serde_json::from_value::<PartyCode>(json!("wxyz")).is_err());
    }

    #[test]
    fn test_error_message_json_format() {
        let msg = ServerMessage::Error {
            message: "Party is full".into(),
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({ "type": "error", "message": "Party is full" })
        );
    }

    #[test]
    fn test_new_host_json_format() {
        let msg = ServerMessage::NewHost {
            host_name: "Bea".into(),
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({ "type": "newHost", "hostName": "Bea" })
        );
    }

    #[test]
    fn test_player_list_flattens_selected_options() {
        let mut selected_options = SelectedOptions::new();
        selected_options.insert("selectedDeck".into(), json!("classic"));
        selected_options.insert("selectedMode".into(), json!({ "rounds": 3 }));

        let msg = ServerMessage::PlayerList {
            players: vec![
                PlayerEntry { name: "Ann".into(), is_host: true },
                PlayerEntry { name: "Bea".into(), is_host: false },
            ],
            party_code: "QXBE".parse().unwrap(),
            selected_options,
        };

        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "playerList",
                "players": [
                    { "name": "Ann", "isHost": true },
                    { "name": "Bea", "isHost": false }
                ],
                "partyCode": "QXBE",
                "selectedDeck": "classic",
                "selectedMode": { "rounds": 3 }
            })
        );

        let decoded: ServerMessage = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_player_list_without_options_omits_them() {
        let msg = ServerMessage::PlayerList {
            players: vec![PlayerEntry { name: "Ann".into(), is_host: true }],
            party_code: "QXBE".parse().unwrap(),
            selected_options: SelectedOptions::new(),
        };
        let value = serde_json::to_value(&msg).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert!(!obj.contains_key("selectedDeck"));
    }
}
