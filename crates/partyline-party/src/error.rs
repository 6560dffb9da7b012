//! Error types for the party layer.

use crate::MemberId;

/// Why a connection could not join a party.
///
/// The `Display` text of each variant except [`JoinError::AlreadyJoined`]
/// is exactly the message sent to the client in its `error` record before
/// the connection is closed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JoinError {
    /// The display name was missing or empty.
    #[error("Player name is required")]
    NameRequired,

    /// A code was given but no live party has it.
    #[error("Party not found")]
    PartyNotFound,

    /// Someone in the party already uses this name, ignoring case.
    #[error("A player with this name already exists in the lobby")]
    DuplicateName,

    /// The party is at capacity.
    #[error("Party is full")]
    PartyFull,

    /// The connection is already a member of a party. Registry-internal:
    /// the server closes such a connection without an `error` record.
    #[error("Already in a party")]
    AlreadyJoined(MemberId),
}

/// Errors from talking to the registry actor.
#[derive(Debug, thiserror::Error)]
pub enum PartyError {
    /// The join was rejected.
    #[error(transparent)]
    Join(#[from] JoinError),

    /// The registry actor has stopped or its command channel is closed.
    #[error("party registry is unavailable")]
    Unavailable,
}
