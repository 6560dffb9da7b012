//! A single party: ordered members, host flag, and selected options.
//!
//! Membership order is join order. The member at index 0 is the host when
//! the party is created, and when a host leaves the earliest-joined member
//! still present takes over.

use partyline_protocol::{OptionUpdate, PartyCode, PlayerEntry, SelectedOptions};

use crate::{JoinError, Member, MemberId, MemberSender};

/// What happened to a party when a member left.
#[derive(Debug, Clone)]
pub enum Departure {
    /// The connection was not a member; nothing changed.
    NotMember,

    /// The last member left. The registry must drop the party.
    Emptied { member: Member },

    /// Members remain. `new_host` names the promoted member when the one
    /// who left was host.
    Remaining {
        member: Member,
        new_host: Option<String>,
    },
}

/// A group of members sharing a code, a host, and selected options.
#[derive(Debug)]
pub struct Party {
    code: PartyCode,
    members: Vec<Member>,
    selected_options: SelectedOptions,
    max_members: usize,
}

impl Party {
    pub(crate) fn new(code: PartyCode, max_members: usize) -> Self {
        Self {
            code,
            members: Vec::new(),
            selected_options: SelectedOptions::new(),
            max_members,
        }
    }

    pub fn code(&self) -> &PartyCode {
        &self.code
    }

    /// Members in join order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= self.max_members
    }

    pub fn selected_options(&self) -> &SelectedOptions {
        &self.selected_options
    }

    /// The current host, if the party has anyone in it.
    pub fn host(&self) -> Option<&Member> {
        self.members.iter().find(|m| m.is_host)
    }

    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    /// Player list in join order, as it appears in a snapshot.
    pub fn players(&self) -> Vec<PlayerEntry> {
        self.members.iter().map(Member::entry).collect()
    }

    /// Case-insensitive name lookup.
    pub fn has_name(&self, name: &str) -> bool {
        let wanted = name.to_lowercase();
        self.members.iter().any(|m| m.name.to_lowercase() == wanted)
    }

    /// Appends a member. The first member of a party becomes host.
    ///
    /// # Errors
    /// Checked in order: [`JoinError::NameRequired`],
    /// [`JoinError::AlreadyJoined`], [`JoinError::DuplicateName`],
    /// [`JoinError::PartyFull`].
    pub fn join(
        &mut self,
        id: MemberId,
        name: &str,
        sender: MemberSender,
    ) -> Result<&Member, JoinError> {
        if name.is_empty() {
            return Err(JoinError::NameRequired);
        }
        if self.member(id).is_some() {
            return Err(JoinError::AlreadyJoined(id));
        }
        if self.has_name(name) {
            return Err(JoinError::DuplicateName);
        }
        if self.is_full() {
            return Err(JoinError::PartyFull);
        }

        let is_host = self.members.is_empty();
        self.members.push(Member {
            id,
            name: name.to_owned(),
            is_host,
            sender,
        });
        Ok(&self.members[self.members.len() - 1])
    }

    /// Removes the member bound to `id` and re-elects a host if needed.
    pub fn leave(&mut self, id: MemberId) -> Departure {
        let Some(index) = self.members.iter().position(|m| m.id == id) else {
            return Departure::NotMember;
        };
        let member = self.members.remove(index);

        if self.members.is_empty() {
            return Departure::Emptied { member };
        }

        let new_host = if member.is_host {
            let successor = &mut self.members[0];
            successor.is_host = true;
            Some(successor.name.clone())
        } else {
            None
        };

        Departure::Remaining { member, new_host }
    }

    /// Applies an option change. A `null` value clears the option.
    pub fn set_option(&mut self, update: OptionUpdate) {
        if update.value.is_null() {
            self.selected_options.remove(&update.key);
        } else {
            self.selected_options.insert(update.key, update.value);
        }
    }
}
