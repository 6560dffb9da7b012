//! Party registry: owns every live party and applies connection events.
//!
//! The registry is a plain single-owner structure. It is not shared between
//! tasks; the registry actor owns it and feeds it one event at a time,
//! which is what makes "mutate, then broadcast" atomic per party.

use std::collections::HashMap;

use partyline_protocol::{Inbound, PartyCode, ServerMessage};
use rand::Rng;

use crate::relay::{broadcast, build_snapshot, relay_verbatim};
use crate::{
    Departure, JoinError, MemberId, MemberSender, Party, PartyConfig,
};

/// A successful join, as reported back to the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedMember {
    pub member_id: MemberId,
    pub party_code: PartyCode,
    pub name: String,
    pub is_host: bool,
}

/// Result of a connection closing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// The connection was not in any party.
    NotMember,
    /// It was the last member; the party no longer exists.
    PartyClosed(PartyCode),
    /// The party lives on. `new_host` is set when the host changed.
    Left {
        party_code: PartyCode,
        new_host: Option<String>,
    },
}

/// Result of one inbound application message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    /// The sender is not in any party.
    NotMember,
    /// Host changed an option; a snapshot went to `reached` members.
    OptionUpdated { reached: usize },
    /// A non-host sent a host command. Dropped without telling the sender.
    NotHost,
    /// The sender used a server-only `type`.
    Reserved,
    /// Forwarded to `reached` members.
    Relayed { reached: usize },
}

/// Maps party codes to parties and members to their party.
pub struct PartyRegistry {
    parties: HashMap<PartyCode, Party>,
    /// A member is in at most ONE party (key invariant).
    member_parties: HashMap<MemberId, PartyCode>,
    config: PartyConfig,
}

impl PartyRegistry {
    /// Creates an empty registry.
    pub fn new(config: PartyConfig) -> Self {
        Self {
            parties: HashMap::new(),
            member_parties: HashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &PartyConfig {
        &self.config
    }

    /// Draws codes until one is not live. Does not reserve it.
    pub fn generate_unique_code(&self) -> PartyCode {
        self.generate_unique_code_with(&mut rand::rng())
    }

    /// [`generate_unique_code`](Self::generate_unique_code) with a caller
    /// supplied random source.
    pub fn generate_unique_code_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> PartyCode {
        loop {
            let code = PartyCode::generate(rng);
            if !self.parties.contains_key(&code) {
                return code;
            }
        }
    }

    /// Finds a live party. Malformed codes simply match nothing.
    pub fn lookup(&self, code: &str) -> Option<&Party> {
        self.parties.get(code)
    }

    /// Inserts an empty party under `code`. The caller must fill it (or
    /// remove it) before giving up `&mut self`.
    pub fn create_party(&mut self, code: PartyCode) -> &mut Party {
        let max_members = self.config.max_members;
        tracing::info!(party_code = %code, "party created");
        self.parties
            .entry(code.clone())
            .or_insert_with(|| Party::new(code, max_members))
    }

    /// Removes a party and forgets its members. No-op if absent.
    pub fn remove_party(&mut self, code: &str) -> Option<Party> {
        let party = self.parties.remove(code)?;
        for member in party.members() {
            self.member_parties.remove(&member.id());
        }
        tracing::info!(party_code = %code, "party closed");
        Some(party)
    }

    /// Joins `member_id` to the party named by `code`, or to a fresh party
    /// when `code` is `None`, then broadcasts the new snapshot.
    ///
    /// Generating and reserving a fresh code happen inside this one call,
    /// so two joins can never be handed the same new code.
    ///
    /// # Errors
    /// Checked in order: [`JoinError::NameRequired`],
    /// [`JoinError::AlreadyJoined`], [`JoinError::PartyNotFound`],
    /// [`JoinError::DuplicateName`], [`JoinError::PartyFull`].
    pub fn join(
        &mut self,
        code: Option<&str>,
        name: &str,
        member_id: MemberId,
        sender: MemberSender,
    ) -> Result<JoinedMember, JoinError> {
        if name.is_empty() {
            return Err(JoinError::NameRequired);
        }
        if self.member_parties.contains_key(&member_id) {
            return Err(JoinError::AlreadyJoined(member_id));
        }

        let party_code = match code {
            Some(raw) => self
                .parties
                .get_key_value(raw)
                .map(|(code, _)| code.clone())
                .ok_or(JoinError::PartyNotFound)?,
            None => {
                let fresh = self.generate_unique_code();
                self.create_party(fresh.clone());
                fresh
            }
        };

        let Some(party) = self.parties.get_mut(party_code.as_str()) else {
            return Err(JoinError::PartyNotFound);
        };

        let is_host = match party.join(member_id, name, sender) {
            Ok(member) => member.is_host(),
            Err(e) => {
                if party.is_empty() {
                    self.parties.remove(party_code.as_str());
                }
                return Err(e);
            }
        };

        self.member_parties.insert(member_id, party_code.clone());
        tracing::info!(
            party_code = %party_code,
            %member_id,
            player = name,
            players = party.len(),
            "player joined party"
        );
        broadcast(party, &build_snapshot(party));

        Ok(JoinedMember {
            member_id,
            party_code,
            name: name.to_owned(),
            is_host,
        })
    }

    /// Removes a closed connection from its party. Tears the party down if
    /// it is now empty; otherwise announces any new host and rebroadcasts
    /// the snapshot.
    pub fn leave(&mut self, member_id: MemberId) -> LeaveOutcome {
        let Some(party_code) = self.member_parties.remove(&member_id) else {
            return LeaveOutcome::NotMember;
        };
        let Some(party) = self.parties.get_mut(party_code.as_str()) else {
            return LeaveOutcome::NotMember;
        };

        match party.leave(member_id) {
            Departure::NotMember => LeaveOutcome::NotMember,
            Departure::Emptied { member } => {
                tracing::info!(
                    party_code = %party_code,
                    %member_id,
                    player = member.name(),
                    players = 0,
                    "player left party"
                );
                self.remove_party(party_code.as_str());
                LeaveOutcome::PartyClosed(party_code)
            }
            Departure::Remaining { member, new_host } => {
                tracing::info!(
                    party_code = %party_code,
                    %member_id,
                    player = member.name(),
                    players = party.len(),
                    "player left party"
                );
                if let Some(host_name) = &new_host {
                    tracing::info!(
                        party_code = %party_code,
                        host = %host_name,
                        "host reassigned"
                    );
                    broadcast(
                        party,
                        &ServerMessage::NewHost {
                            host_name: host_name.clone(),
                        },
                    );
                }
                broadcast(party, &build_snapshot(party));
                LeaveOutcome::Left {
                    party_code,
                    new_host,
                }
            }
        }
    }

    /// Applies one classified frame from `member_id`.
    pub fn handle_message(
        &mut self,
        member_id: MemberId,
        inbound: Inbound,
    ) -> MessageOutcome {
        let relay_mode = self.config.relay_mode;
        let Some(party) = self
            .member_parties
            .get(&member_id)
            .and_then(|code| self.parties.get_mut(code.as_str()))
        else {
            return MessageOutcome::NotMember;
        };
        let is_host = party.member(member_id).is_some_and(|m| m.is_host());

        match inbound {
            Inbound::UpdateOption(update) if is_host => {
                tracing::debug!(
                    party_code = %party.code(),
                    key = %update.key,
                    "option updated"
                );
                party.set_option(update);
                let reached = broadcast(party, &build_snapshot(party));
                MessageOutcome::OptionUpdated { reached }
            }
            Inbound::UpdateOption(update) => {
                tracing::debug!(
                    party_code = %party.code(),
                    %member_id,
                    key = %update.key,
                    "ignoring option update from non-host"
                );
                MessageOutcome::NotHost
            }
            Inbound::Reserved(kind) => {
                tracing::debug!(
                    party_code = %party.code(),
                    %member_id,
                    %kind,
                    "dropping client message with server-only type"
                );
                MessageOutcome::Reserved
            }
            Inbound::Relay(payload) => {
                let reached =
                    relay_verbatim(party, member_id, &payload, relay_mode);
                MessageOutcome::Relayed { reached }
            }
        }
    }

    /// The party `member_id` belongs to, if any.
    pub fn party_of(&self, member_id: MemberId) -> Option<&Party> {
        self.member_parties
            .get(&member_id)
            .and_then(|code| self.parties.get(code.as_str()))
    }

    /// Number of live parties.
    pub fn party_count(&self) -> usize {
        self.parties.len()
    }

    /// Number of members across all parties.
    pub fn member_count(&self) -> usize {
        self.member_parties.len()
    }

    /// Codes of all live parties.
    pub fn codes(&self) -> Vec<PartyCode> {
        self.parties.keys().cloned().collect()
    }
}

impl Default for PartyRegistry {
    fn default() -> Self {
        Self::new(PartyConfig::default())
    }
}
