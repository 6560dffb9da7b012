//! `PartylineServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → party registry.

use std::sync::Arc;

use partyline_party::{PartyConfig, RegistryHandle, spawn_registry};
use partyline_protocol::{Codec, JsonCodec};
use partyline_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::{PartylineError, ServerConfig};

/// Shared server state passed to each connection task.
///
/// Wrapped in `Arc` so every task gets a cheap clone. No `Mutex`: all
/// mutable party state lives behind the registry actor.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) registry: RegistryHandle,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Partyline server.
///
/// # Example
///
/// ```rust,ignore
/// let server = PartylineServer::builder()
///     .bind("127.0.0.1:0")
///     .party_config(PartyConfig { max_members: 4, ..Default::default() })
///     .build()
///     .await?;
/// ```
pub struct PartylineServerBuilder {
    config: ServerConfig,
}

impl PartylineServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Sets the rules applied to every party.
    pub fn party_config(mut self, config: PartyConfig) -> Self {
        self.config.party = config;
        self
    }

    /// Binds the listener and starts the registry actor.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(
        self,
    ) -> Result<PartylineServer<JsonCodec>, PartylineError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr)
            .await?
            .with_handshake_timeout(self.config.handshake_timeout);

        let registry =
            spawn_registry(self.config.party, self.config.command_queue);

        let state = Arc::new(ServerState {
            registry,
            codec: JsonCodec,
        });

        Ok(PartylineServer { transport, state })
    }
}

impl Default for PartylineServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Partyline server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct PartylineServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl PartylineServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> PartylineServerBuilder {
        PartylineServerBuilder::new()
    }
}

impl<C: Codec> PartylineServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// A handle to the party registry, e.g. to inspect live parties.
    pub fn registry(&self) -> RegistryHandle {
        self.state.registry.clone()
    }

    /// Runs the accept loop.
    ///
    /// Each accepted socket gets its own task that drives it from the
    /// WebSocket upgrade through join to close, so a peer that stalls
    /// mid-handshake only holds up itself. Runs until the process is
    /// terminated.
    pub async fn run(mut self) -> Result<(), PartylineError> {
        if let Ok(addr) = self.transport.local_addr() {
            tracing::info!(%addr, "Partyline server running");
        }

        loop {
            match self.transport.accept().await {
                Ok(pending) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(pending, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                }
            }
        }
    }
}
