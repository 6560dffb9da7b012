//! Per-connection handler: join, message loop, and close.
//!
//! Each accepted socket gets its own Tokio task running this handler.
//! The connection moves through three states:
//!
//! ```text
//! Connecting ──upgrade + join ok──► Joined ──recv None / error──► Closed
//!     │
//!     ├──upgrade failed / timed out──► socket dropped
//!     └──join rejected──► error record sent, socket closed
//! ```
//!
//! While joined, a second task drains the member's outbound channel onto
//! the socket so broadcasts never wait on this task's `recv`.

use std::sync::Arc;

use partyline_party::{
    JoinError, LeaveOutcome, MemberId, PartyError, PartyOutbound,
    RegistryHandle,
};
use partyline_protocol::{Codec, Inbound, JoinRequest, ServerMessage};
use partyline_transport::{
    Connection, Handshake, PendingWebSocket, WebSocketConnection,
};
use tokio::sync::mpsc;

use crate::PartylineError;
use crate::server::ServerState;

/// Drop guard that reports the close to the registry when the handler
/// exits, including by panic. `Drop` is synchronous, so the leave runs
/// in a fire-and-forget task.
struct MembershipGuard {
    member_id: MemberId,
    registry: RegistryHandle,
}

impl Drop for MembershipGuard {
    fn drop(&mut self) {
        let member_id = self.member_id;
        let registry = self.registry.clone();
        tokio::spawn(async move {
            match registry.leave(member_id).await {
                Ok(LeaveOutcome::PartyClosed(code)) => {
                    tracing::debug!(%member_id, party_code = %code, "last member gone");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(%member_id, error = %e, "leave not applied");
                }
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    pending: PendingWebSocket,
    state: Arc<ServerState<C>>,
) -> Result<(), PartylineError> {
    // --- Connecting ---
    let conn_id = pending.id();
    let peer = pending.peer_addr();
    let conn = match pending.complete().await {
        Ok(conn) => Arc::new(conn),
        Err(e) => {
            tracing::debug!(%conn_id, %peer, error = %e, "upgrade failed");
            return Err(e.into());
        }
    };
    let member_id = MemberId(conn.id().into_inner());
    let request = JoinRequest::from_query(conn.query());
    tracing::debug!(
        %member_id,
        party_code = ?request.party_code,
        player = %request.player_name,
        "join requested"
    );

    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let joined = match state.registry.join(member_id, request, outbound_tx).await {
        Ok(joined) => joined,
        Err(PartyError::Join(reason)) => {
            reject(&conn, &state.codec, &reason).await?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    // --- Joined ---
    let _guard = MembershipGuard {
        member_id,
        registry: state.registry.clone(),
    };
    tokio::spawn(write_outbound(
        Arc::clone(&conn),
        Arc::clone(&state),
        outbound_rx,
    ));
    tracing::debug!(
        %member_id,
        party_code = %joined.party_code,
        host = joined.is_host,
        "connection joined"
    );

    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::debug!(%member_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%member_id, error = %e, "recv error");
                break;
            }
        };

        let inbound = match Inbound::classify(&state.codec, &data) {
            Ok(inbound) => inbound,
            Err(e) => {
                tracing::debug!(
                    %member_id,
                    error = %e,
                    "dropping malformed message"
                );
                continue;
            }
        };

        state.registry.send_message(member_id, inbound).await?;
    }

    // --- Closed ---
    // _guard drops here → registry leave fires. The writer stops once the
    // registry drops this member's sender.
    Ok(())
}

/// The `error` record a rejected client receives, if any.
///
/// `AlreadyJoined` is a registry safeguard, not a client-facing answer:
/// each socket joins exactly once, so seeing it means a server bug. That
/// connection is closed without an error record.
fn rejection_record(reason: &JoinError) -> Option<ServerMessage> {
    match reason {
        JoinError::AlreadyJoined(_) => None,
        _ => Some(ServerMessage::Error {
            message: reason.to_string(),
        }),
    }
}

/// Sends the join error, then closes the socket.
async fn reject(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    reason: &JoinError,
) -> Result<(), PartylineError> {
    match rejection_record(reason) {
        Some(record) => {
            tracing::info!(conn_id = %conn.id(), %reason, "join rejected");
            conn.send(&codec.encode(&record)?).await?;
        }
        None => {
            tracing::warn!(conn_id = %conn.id(), %reason, "duplicate join on one connection");
        }
    }
    conn.close().await?;
    Ok(())
}

/// Writes everything the registry queues for this member onto the socket.
async fn write_outbound<C: Codec>(
    conn: Arc<WebSocketConnection>,
    state: Arc<ServerState<C>>,
    mut outbound: mpsc::UnboundedReceiver<PartyOutbound>,
) {
    while let Some(item) = outbound.recv().await {
        let result = match item {
            PartyOutbound::Message(msg) => match state.codec.encode(&msg) {
                Ok(bytes) => conn.send(&bytes).await,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to encode server message");
                    continue;
                }
            },
            PartyOutbound::Relay(payload) => conn.send(&payload).await,
        };

        if let Err(e) = result {
            tracing::debug!(conn_id = %conn.id(), error = %e, "send failed, stopping writer");
            break;
        }
    }
}
