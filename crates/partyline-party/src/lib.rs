//! Party membership and broadcast relay engine for Partyline.
//!
//! All parties live in one [`PartyRegistry`] owned by a single Tokio task
//! (the registry actor). Connection handlers talk to it through a cloneable
//! [`RegistryHandle`], so every join, message, and departure is applied one
//! at a time and its broadcasts go out before the next event is looked at.
//!
//! # Key types
//!
//! - [`PartyRegistry`]: code → party map, code generation, event handling
//! - [`Party`] / [`Member`]: ordered membership, host flag, options
//! - [`relay`]: snapshot building and fan-out
//! - [`RegistryHandle`]: send commands to the running registry actor
//! - [`PartyConfig`]: capacity and relay mode

mod actor;
mod config;
mod error;
mod member;
mod party;
pub mod relay;
mod registry;

pub use actor::{PartyInfo, RegistryHandle, spawn_registry};
pub use config::{PartyConfig, RelayMode};
pub use error::{JoinError, PartyError};
pub use member::{Member, MemberId, MemberSender, PartyOutbound};
pub use party::{Departure, Party};
pub use registry::{JoinedMember, LeaveOutcome, MessageOutcome, PartyRegistry};
