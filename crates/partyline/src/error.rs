//! Unified error type for the Partyline server.

use partyline_party::PartyError;
use partyline_protocol::ProtocolError;
use partyline_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates a `From` impl, so the
/// `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum PartylineError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A party-level error (rejected join, registry gone).
    #[error(transparent)]
    Party(#[from] PartyError),

    /// Bad configuration, e.g. an unparseable `PORT`.
    #[error("invalid configuration: {0}")]
    Config(String),
}
