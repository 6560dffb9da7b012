//! # Partyline
//!
//! Real-time lobby relay. Clients open a WebSocket with `playerName` (and
//! optionally `partyCode`) in the query string, land in a party, and get
//! every other member's messages relayed to them. The server keeps the
//! player list, host, and host-selected options, and rebroadcasts a full
//! snapshot whenever any of them changes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use partyline::prelude::*;
//!
//! # async fn run() -> Result<(), PartylineError> {
//! let server = PartylineServer::builder()
//!     .bind("0.0.0.0:3000")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::{DEFAULT_PORT, ServerConfig};
pub use error::PartylineError;
pub use server::{PartylineServer, PartylineServerBuilder};

pub mod prelude {
    //! Everything needed to embed and test a server.

    pub use crate::{
        PartylineError, PartylineServer, PartylineServerBuilder, ServerConfig,
    };
    pub use partyline_party::{PartyConfig, PartyInfo, RegistryHandle, RelayMode};
    pub use partyline_protocol::{PartyCode, PlayerEntry, ServerMessage};
}
