//! Registry actor: one Tokio task that owns the [`PartyRegistry`].
//!
//! Connection handlers never touch the registry directly. They send
//! commands over an mpsc channel and the actor applies them strictly in
//! arrival order, so a membership change and the broadcast it triggers
//! always finish before the next command is read. No locks needed.

use partyline_protocol::{
    Inbound, JoinRequest, PartyCode, PlayerEntry, SelectedOptions,
};
use tokio::sync::{mpsc, oneshot};

use crate::{
    JoinError, JoinedMember, LeaveOutcome, MemberId, MemberSender,
    PartyConfig, PartyError, PartyRegistry,
};

/// Commands sent to the registry actor through its channel.
///
/// The `oneshot::Sender` in some variants is the reply channel: the caller
/// sends a command and waits for the answer on it.
pub(crate) enum RegistryCommand {
    /// Join an existing party or create one.
    Join {
        member_id: MemberId,
        request: JoinRequest,
        sender: MemberSender,
        reply: oneshot::Sender<Result<JoinedMember, JoinError>>,
    },

    /// Apply one classified frame from a member.
    Message {
        member_id: MemberId,
        inbound: Inbound,
    },

    /// A member's connection closed.
    Leave {
        member_id: MemberId,
        reply: oneshot::Sender<LeaveOutcome>,
    },

    /// Look up a live party.
    Lookup {
        code: String,
        reply: oneshot::Sender<Option<PartyInfo>>,
    },

    /// Count live parties.
    PartyCount { reply: oneshot::Sender<usize> },

    /// Stop the actor.
    Shutdown,
}

/// A read-only copy of one party's state.
#[derive(Debug, Clone, PartialEq)]
pub struct PartyInfo {
    pub code: PartyCode,
    pub players: Vec<PlayerEntry>,
    pub selected_options: SelectedOptions,
}

/// Handle to the running registry actor. Cheap to clone; every connection
/// task holds one.
#[derive(Clone)]
pub struct RegistryHandle {
    sender: mpsc::Sender<RegistryCommand>,
}

impl RegistryHandle {
    /// Asks the registry to join this connection to a party.
    ///
    /// # Errors
    /// [`PartyError::Join`] when the join is rejected,
    /// [`PartyError::Unavailable`] when the actor is gone.
    pub async fn join(
        &self,
        member_id: MemberId,
        request: JoinRequest,
        sender: MemberSender,
    ) -> Result<JoinedMember, PartyError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RegistryCommand::Join {
            member_id,
            request,
            sender,
            reply: reply_tx,
        })
        .await?;
        let joined = reply_rx.await.map_err(|_| PartyError::Unavailable)??;
        Ok(joined)
    }

    /// Hands a classified frame to the registry (fire-and-forget).
    pub async fn send_message(
        &self,
        member_id: MemberId,
        inbound: Inbound,
    ) -> Result<(), PartyError> {
        self.send(RegistryCommand::Message { member_id, inbound })
            .await
    }

    /// Reports that a member's connection closed.
    pub async fn leave(
        &self,
        member_id: MemberId,
    ) -> Result<LeaveOutcome, PartyError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RegistryCommand::Leave {
            member_id,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| PartyError::Unavailable)
    }

    /// Returns a copy of the party with this code, if it is live.
    pub async fn lookup(
        &self,
        code: &str,
    ) -> Result<Option<PartyInfo>, PartyError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RegistryCommand::Lookup {
            code: code.to_owned(),
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| PartyError::Unavailable)
    }

    /// Number of live parties.
    pub async fn party_count(&self) -> Result<usize, PartyError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RegistryCommand::PartyCount { reply: reply_tx })
            .await?;
        reply_rx.await.map_err(|_| PartyError::Unavailable)
    }

    /// Tells the actor to stop.
    pub async fn shutdown(&self) -> Result<(), PartyError> {
        self.send(RegistryCommand::Shutdown).await
    }

    async fn send(&self, cmd: RegistryCommand) -> Result<(), PartyError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| PartyError::Unavailable)
    }
}

/// The actor state. Runs inside a Tokio task.
struct RegistryActor {
    registry: PartyRegistry,
    receiver: mpsc::Receiver<RegistryCommand>,
}

impl RegistryActor {
    /// Processes commands until shutdown or until every handle is dropped.
    async fn run(mut self) {
        tracing::info!("party registry started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RegistryCommand::Join {
                    member_id,
                    request,
                    sender,
                    reply,
                } => {
                    let result = self.registry.join(
                        request.party_code.as_deref(),
                        &request.player_name,
                        member_id,
                        sender,
                    );
                    if let Err(e) = &result {
                        tracing::debug!(%member_id, error = %e, "join rejected");
                    }
                    // Nobody is left to report this member's close, so
                    // undo the join instead of leaving a ghost behind.
                    if let Err(Ok(joined)) = reply.send(result) {
                        tracing::debug!(
                            %member_id,
                            party_code = %joined.party_code,
                            "join caller went away, rolling back"
                        );
                        self.registry.leave(joined.member_id);
                    }
                }
                RegistryCommand::Message { member_id, inbound } => {
                    let outcome =
                        self.registry.handle_message(member_id, inbound);
                    tracing::trace!(%member_id, ?outcome, "message handled");
                }
                RegistryCommand::Leave { member_id, reply } => {
                    let _ = reply.send(self.registry.leave(member_id));
                }
                RegistryCommand::Lookup { code, reply } => {
                    let info =
                        self.registry.lookup(&code).map(|party| PartyInfo {
                            code: party.code().clone(),
                            players: party.players(),
                            selected_options: party
                                .selected_options()
                                .clone(),
                        });
                    let _ = reply.send(info);
                }
                RegistryCommand::PartyCount { reply } => {
                    let _ = reply.send(self.registry.party_count());
                }
                RegistryCommand::Shutdown => {
                    tracing::info!("party registry shutting down");
                    break;
                }
            }
        }

        tracing::info!(
            parties = self.registry.party_count(),
            "party registry stopped"
        );
    }
}

/// Spawns the registry actor and returns a handle to it.
///
/// `channel_size` bounds the command queue; when it fills up, connection
/// tasks wait, which throttles inbound traffic instead of buffering it.
/// A size of zero is raised to one.
pub fn spawn_registry(config: PartyConfig, channel_size: usize) -> RegistryHandle {
    let (tx, rx) = mpsc::channel(channel_size.max(1));

    let actor = RegistryActor {
        registry: PartyRegistry::new(config),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RegistryHandle { sender: tx }
}
