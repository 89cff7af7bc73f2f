//! Cart owners and the transitions between them.

use core::fmt;

/// Slot key used for the anonymous cart.
pub const GUEST_SLOT: &str = "guest";

/// Who the live cart belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum CartIdentity {
    /// Anonymous visitor.
    #[default]
    Guest,
    /// Authenticated user, keyed by the backend's stringified user ID.
    User(String),
}

impl CartIdentity {
    /// Build from an optional user ID, `None` meaning guest.
    #[must_use]
    pub fn from_user_id(user_id: Option<&str>) -> Self {
        user_id.map_or(Self::Guest, |id| Self::User(id.to_owned()))
    }

    /// Key of this identity's slot in the persisted slot map.
    #[must_use]
    pub fn slot_key(&self) -> &str {
        match self {
            Self::Guest => GUEST_SLOT,
            Self::User(id) => id,
        }
    }

    /// The user ID, or `None` for guests.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::Guest => None,
            Self::User(id) => Some(id),
        }
    }

    /// Whether this is the anonymous identity.
    #[must_use]
    pub const fn is_guest(&self) -> bool {
        matches!(self, Self::Guest)
    }
}

impl fmt::Display for CartIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Guest => f.write_str(GUEST_SLOT),
            Self::User(id) => write!(f, "user:{id}"),
        }
    }
}

/// Kind of identity change applied to the cart.
///
/// Guest to guest never happens: equal identities are filtered out before a
/// transition is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Login from an anonymous session. The guest slot is wiped.
    GuestToUser,
    /// Logout. The guest slot is wiped and the live cart starts empty.
    UserToGuest,
    /// Account switch. Both slots are left as they are.
    UserToUser,
}

impl Transition {
    /// Classify a change of identity, or `None` if nothing changes.
    #[must_use]
    pub fn between(from: &CartIdentity, to: &CartIdentity) -> Option<Self> {
        match (from, to) {
            (a, b) if a == b => None,
            (CartIdentity::Guest, CartIdentity::User(_)) => Some(Self::GuestToUser),
            (CartIdentity::User(_), CartIdentity::Guest) => Some(Self::UserToGuest),
            (CartIdentity::User(_), CartIdentity::User(_)) => Some(Self::UserToUser),
            (CartIdentity::Guest, CartIdentity::Guest) => None,
        }
    }

    /// Whether the guest slot is cleared as part of this transition.
    #[must_use]
    pub const fn clears_guest_slot(self) -> bool {
        matches!(self, Self::GuestToUser | Self::UserToGuest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> CartIdentity {
        CartIdentity::User(id.to_string())
    }

    #[test]
    fn test_slot_keys() {
        assert_eq!(CartIdentity::Guest.slot_key(), "guest");
        assert_eq!(user("42").slot_key(), "42");
    }

    #[test]
    fn test_from_user_id() {
        assert_eq!(CartIdentity::from_user_id(None), CartIdentity::Guest);
        assert_eq!(CartIdentity::from_user_id(Some("7")), user("7"));
    }

    #[test]
    fn test_transition_kinds() {
        assert_eq!(
            Transition::between(&CartIdentity::Guest, &user("1")),
            Some(Transition::GuestToUser)
        );
        assert_eq!(
            Transition::between(&user("1"), &CartIdentity::Guest),
            Some(Transition::UserToGuest)
        );
        assert_eq!(
            Transition::between(&user("1"), &user("2")),
            Some(Transition::UserToUser)
        );
    }

    #[test]
    fn test_same_identity_is_no_transition() {
        assert_eq!(
            Transition::between(&CartIdentity::Guest, &CartIdentity::Guest),
            None
        );
        assert_eq!(Transition::between(&user("1"), &user("1")), None);
    }

    #[test]
    fn test_clears_guest_slot() {
        assert!(Transition::GuestToUser.clears_guest_slot());
        assert!(Transition::UserToGuest.clears_guest_slot());
        assert!(!Transition::UserToUser.clears_guest_slot());
    }
}
