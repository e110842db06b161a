//! Identity references: the person a movement's money concerns.

use std::collections::HashSet;

use hearth_shared::types::{ContactId, UserId};
use serde::{Deserialize, Serialize};

/// A person involved in a movement, either a registered household member or an
/// external contact.
///
/// Used as an opaque key when accumulating balances. `Member` sorts before
/// `Contact`, then by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum Party {
    /// A registered user.
    Member(UserId),
    /// An external contact of the household.
    Contact(ContactId),
}

/// Both or neither of the member/contact halves were supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmbiguousParty;

impl Party {
    /// Builds a party from the two optional halves used on the wire.
    ///
    /// # Errors
    ///
    /// Returns `AmbiguousParty` unless exactly one half is set.
    pub fn from_parts(
        member: Option<UserId>,
        contact: Option<ContactId>,
    ) -> Result<Self, AmbiguousParty> {
        match (member, contact) {
            (Some(user_id), None) => Ok(Self::Member(user_id)),
            (None, Some(contact_id)) => Ok(Self::Contact(contact_id)),
            _ => Err(AmbiguousParty),
        }
    }

    /// Returns true for a registered member.
    #[must_use]
    pub const fn is_member(&self) -> bool {
        matches!(self, Self::Member(_))
    }

    /// Returns the user id for a member.
    #[must_use]
    pub const fn member_id(&self) -> Option<UserId> {
        match self {
            Self::Member(user_id) => Some(*user_id),
            Self::Contact(_) => None,
        }
    }

    /// Returns the contact id for a contact.
    #[must_use]
    pub const fn contact_id(&self) -> Option<ContactId> {
        match self {
            Self::Member(_) => None,
            Self::Contact(contact_id) => Some(*contact_id),
        }
    }

    /// Returns true if this party is a member in the given set.
    #[must_use]
    pub fn is_member_of(&self, members: &HashSet<UserId>) -> bool {
        self.member_id()
            .is_some_and(|user_id| members.contains(&user_id))
    }
}

impl std::fmt::Display for Party {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Member(user_id) => write!(f, "member:{user_id}"),
            Self::Contact(contact_id) => write!(f, "contact:{contact_id}"),
        }
    }
}
