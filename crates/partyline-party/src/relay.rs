//! Fan-out of snapshots and relayed messages to party members.
//!
//! Delivery is best-effort: members whose connection writer has gone away
//! are skipped here and cleaned up when their close event arrives.

use std::sync::Arc;

use partyline_protocol::ServerMessage;

use crate::{MemberId, Party, PartyOutbound, RelayMode};

/// Sends `message` to every open member. Returns how many were reached.
pub fn broadcast(party: &Party, message: &ServerMessage) -> usize {
    party
        .members()
        .iter()
        .filter(|m| m.deliver(PartyOutbound::Message(message.clone())))
        .count()
}

/// The canonical `playerList` record for `party`'s current state.
pub fn build_snapshot(party: &Party) -> ServerMessage {
    ServerMessage::PlayerList {
        players: party.players(),
        party_code: party.code().clone(),
        selected_options: party.selected_options().clone(),
    }
}

/// Forwards `payload` unchanged from `from` to the members `mode` selects.
/// Returns how many were reached.
pub fn relay_verbatim(
    party: &Party,
    from: MemberId,
    payload: &Arc<[u8]>,
    mode: RelayMode,
) -> usize {
    party
        .members()
        .iter()
        .filter(|m| mode == RelayMode::All || m.id() != from)
        .filter(|m| m.deliver(PartyOutbound::Relay(Arc::clone(payload))))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use partyline_protocol::{OptionUpdate, PlayerEntry};
    use serde_json::json;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn party_of(
        names: &[&str],
    ) -> (Party, Vec<UnboundedReceiver<PartyOutbound>>) {
        let mut party = Party::new("QXBE".parse().unwrap(), 8);
        let mut receivers = Vec::new();
        for (i, name) in names.iter().enumerate() {
            let (tx, rx) = mpsc::unbounded_channel();
            party.join(MemberId(i as u64 + 1), name, tx).unwrap();
            receivers.push(rx);
        }
        (party, receivers)
    }

    #[test]
    fn test_snapshot_lists_players_in_join_order() {
        let (mut party, _rx) = party_of(&["Ann", "Bea"]);
        party.set_option(OptionUpdate {
            key: "selectedMode".into(),
            value: json!("speed"),
        });

        let ServerMessage::PlayerList {
            players,
            party_code,
            selected_options,
        } = build_snapshot(&party)
        else {
            panic!("snapshot must be a playerList");
        };
        assert_eq!(
            players,
            vec![
                PlayerEntry { name: "Ann".into(), is_host: true },
                PlayerEntry { name: "Bea".into(), is_host: false },
            ]
        );
        assert_eq!(party_code.as_str(), "QXBE");
        assert_eq!(selected_options["selectedMode"], json!("speed"));
    }

    #[test]
    fn test_broadcast_reaches_every_open_member_once() {
        let (party, mut rx) = party_of(&["Ann", "Bea", "Cy"]);
        let msg = ServerMessage::NewHost { host_name: "Bea".into() };

        assert_eq!(broadcast(&party, &msg), 3);
        for r in &mut rx {
            assert_eq!(r.try_recv().unwrap(), PartyOutbound::Message(msg.clone()));
            assert!(r.try_recv().is_err());
        }
    }

    #[test]
    fn test_broadcast_skips_closed_members() {
        let (party, mut rx) = party_of(&["Ann", "Bea", "Cy"]);
        let closed = rx.remove(1);
        drop(closed);

        let msg = build_snapshot(&party);
        assert_eq!(broadcast(&party, &msg), 2);
        assert!(rx[0].try_recv().is_ok());
        assert!(rx[1].try_recv().is_ok());
    }

    #[test]
    fn test_relay_all_includes_sender() {
        let (party, mut rx) = party_of(&["Ann", "Bea"]);
        let payload: Arc<[u8]> = Arc::from(&br#"{"type":"go"}"#[..]);

        assert_eq!(relay_verbatim(&party, MemberId(1), &payload, RelayMode::All), 2);
        for r in &mut rx {
            assert_eq!(r.try_recv().unwrap(), PartyOutbound::Relay(payload.clone()));
        }
    }

    #[test]
    fn test_relay_all_except_sender_skips_sender() {
        let (party, mut rx) = party_of(&["Ann", "Bea", "Cy"]);
        let payload: Arc<[u8]> = Arc::from(&br#"{"type":"go"}"#[..]);

        let reached =
            relay_verbatim(&party, MemberId(2), &payload, RelayMode::AllExceptSender);
        assert_eq!(reached, 2);
        assert!(rx[0].try_recv().is_ok());
        assert!(rx[1].try_recv().is_err());
        assert!(rx[2].try_recv().is_ok());
    }
}
