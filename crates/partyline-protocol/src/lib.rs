//! Wire protocol for Partyline.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Types** ([`PartyCode`], [`ServerMessage`], [`PlayerEntry`]): the
//!   records the server sends.
//! - **Inbound** ([`Inbound`]): how a client frame is classified before
//!   the party engine sees it.
//! - **Join** ([`JoinRequest`]): the parameters carried by the request
//!   that opens a connection.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how messages become bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! The protocol layer knows nothing about connections or parties:
//!
//! ```text
//! Transport (bytes) → Protocol (Inbound / ServerMessage) → Party engine
//! ```

mod codec;
mod error;
mod inbound;
mod join;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use inbound::{Inbound, OptionUpdate};
pub use join::JoinRequest;
pub use types::{
    PartyCode, PlayerEntry, SelectedOptions, ServerMessage, RESERVED_TYPES,
};
