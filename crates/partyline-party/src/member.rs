//! Party members and the channel used to reach them.

use std::fmt;
use std::sync::Arc;

use partyline_protocol::{PlayerEntry, ServerMessage};
use tokio::sync::mpsc;

/// Identifies one joined connection for as long as it stays open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberId(pub u64);

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M-{}", self.0)
    }
}

/// Something the engine wants written to a member's connection.
#[derive(Debug, Clone, PartialEq)]
pub enum PartyOutbound {
    /// A server-originated record (snapshot, new host).
    Message(ServerMessage),
    /// Another member's application frame, byte for byte.
    Relay(Arc<[u8]>),
}

/// Channel sender that feeds a member's connection writer.
///
/// Unbounded so that a fan-out never waits on a slow reader. The writer
/// owns the receiving half; once it is gone the member counts as closed.
pub type MemberSender = mpsc::UnboundedSender<PartyOutbound>;

/// A connection that has joined a party.
#[derive(Debug, Clone)]
pub struct Member {
    pub(crate) id: MemberId,
    pub(crate) name: String,
    pub(crate) is_host: bool,
    pub(crate) sender: MemberSender,
}

impl Member {
    pub fn id(&self) -> MemberId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_host(&self) -> bool {
        self.is_host
    }

    /// Non-blocking check that the connection writer is still listening.
    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Queues `outbound` if the connection is open. Returns whether it was
    /// queued; a closed member is skipped, not an error.
    pub(crate) fn deliver(&self, outbound: PartyOutbound) -> bool {
        self.is_open() && self.sender.send(outbound).is_ok()
    }

    pub(crate) fn entry(&self) -> PlayerEntry {
        PlayerEntry {
            name: self.name.clone(),
            is_host: self.is_host,
        }
    }
}
