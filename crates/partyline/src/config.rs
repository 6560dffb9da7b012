//! Server configuration.

use std::time::Duration;

use partyline_party::PartyConfig;
use partyline_transport::DEFAULT_HANDSHAKE_TIMEOUT;

use crate::PartylineError;

/// Port used when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 3000;

/// Settings for one server instance.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,

    /// Rules applied to every party.
    pub party: PartyConfig,

    /// Capacity of the registry actor's command queue. Zero is treated
    /// as one.
    pub command_queue: usize,

    /// How long a new socket may take to send its upgrade request.
    pub handshake_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: format!("0.0.0.0:{DEFAULT_PORT}"),
            party: PartyConfig::default(),
            command_queue: 1024,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }
}

impl ServerConfig {
    /// Defaults, with the listen port taken from `PORT` when set.
    ///
    /// # Errors
    /// [`PartylineError::Config`] if `PORT` is not a valid port number.
    pub fn from_env() -> Result<Self, PartylineError> {
        Self::from_port_var(std::env::var("PORT").ok().as_deref())
    }

    fn from_port_var(port: Option<&str>) -> Result<Self, PartylineError> {
        let port = match port.map(str::trim).filter(|p| !p.is_empty()) {
            Some(raw) => raw.parse::<u16>().map_err(|e| {
                PartylineError::Config(format!("PORT={raw:?}: {e}"))
            })?,
            None => DEFAULT_PORT,
        };
        Ok(Self {
            bind_addr: format!("0.0.0.0:{port}"),
            ..Self::default()
        })
    }
}
