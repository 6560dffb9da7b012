//! Join parameters carried by the connection request.
//!
//! A client opens `ws://host/?partyCode=QXBE&playerName=Ann`. Leaving out
//! `partyCode` (or sending it empty) asks for a brand-new party.

use percent_encoding::percent_decode_str;

/// What a connecting client asked for.
///
/// Nothing is validated here: an empty name or a malformed code is the
/// party engine's call, so it can answer with the right error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinRequest {
    /// Code of the party to join; `None` creates a new party.
    pub party_code: Option<String>,
    /// Display name; empty when the parameter was missing.
    pub player_name: String,
}

impl JoinRequest {
    /// Parses an `application/x-www-form-urlencoded` query string.
    ///
    /// Unknown keys are ignored and the first occurrence of a key wins.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut party_code = None;
        let mut player_name = None;

        for pair in query.unwrap_or_default().split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match decode(key).as_str() {
                "partyCode" if party_code.is_none() => {
                    party_code = Some(decode(value));
                }
                "playerName" if player_name.is_none() => {
                    player_name = Some(decode(value));
                }
                _ => {}
            }
        }

        Self {
            party_code: party_code.filter(|code| !code.is_empty()),
            player_name: player_name.unwrap_or_default(),
        }
    }
}

fn decode(component: &str) -> String {
    let spaced = component.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}
