//! Error types for the protocol layer.
//!
//! Each crate in Partyline defines its own error enum. A `ProtocolError`
//! always means the bytes or their shape were wrong, never the network
//! or party state.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, missing fields, wrong types.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A party code that is not four uppercase ASCII letters.
    #[error("invalid party code: {0:?}")]
    InvalidPartyCode(String),

    /// The message parsed but violates protocol rules, e.g. an
    /// `updateOption` without a string `key`.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
