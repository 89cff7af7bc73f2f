//! Identity change notifications.
//!
//! Authentication events reach the cart as [`IdentityChange`] values. Each
//! carries a sequence number taken when the event *started*, so a slow
//! session check that resolves after a newer login can be recognized as
//! stale and dropped by [`CartEngine::apply_identity`].
//!
//! [`CartEngine::apply_identity`]: crate::cart::CartEngine::apply_identity

use core::fmt;

use techverse_core::UserId;
use tracing::info;

/// What produced an identity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityEvent {
    /// Successful login.
    Login,
    /// Logout, local or server side.
    Logout,
    /// Result of the start-up session check.
    Verify,
}

impl fmt::Display for IdentityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Login => "login",
            Self::Logout => "logout",
            Self::Verify => "verify",
        })
    }
}

/// A sequenced identity notification for the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityChange {
    /// Position of the originating event. Higher is newer.
    pub sequence: u64,
    /// User ID, or `None` for a guest.
    pub identity: Option<String>,
    /// Which event produced the change.
    pub event: IdentityEvent,
}

/// A session check that has been started but not resolved yet.
///
/// The sequence number is reserved at creation so the eventual result is
/// ordered by when the check began.
#[derive(Debug)]
#[must_use = "a verify ticket does nothing until it is resolved"]
pub struct VerifyTicket {
    sequence: u64,
}

impl VerifyTicket {
    /// Sequence number reserved for this check.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Turn the check result into a change. `None` means no valid session.
    #[must_use]
    pub fn resolve(self, user_id: Option<UserId>) -> IdentityChange {
        IdentityChange {
            sequence: self.sequence,
            identity: user_id.map(|id| id.to_string()),
            event: IdentityEvent::Verify,
        }
    }
}

/// Issues identity changes with strictly increasing sequence numbers.
#[derive(Debug, Default)]
pub struct IdentityNotifier {
    last_issued: u64,
}

impl IdentityNotifier {
    /// Create a notifier. The first change gets sequence 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A login completed for `user_id`.
    pub fn logged_in(&mut self, user_id: UserId) -> IdentityChange {
        let change = IdentityChange {
            sequence: self.next_sequence(),
            identity: Some(user_id.to_string()),
            event: IdentityEvent::Login,
        };
        info!(sequence = change.sequence, user_id = %user_id, "Identity change: login");
        change
    }

    /// The user logged out.
    pub fn logged_out(&mut self) -> IdentityChange {
        let change = IdentityChange {
            sequence: self.next_sequence(),
            identity: None,
            event: IdentityEvent::Logout,
        };
        info!(sequence = change.sequence, "Identity change: logout");
        change
    }

    /// Start a session check. Resolve the ticket once the backend answers.
    pub fn begin_verify(&mut self) -> VerifyTicket {
        VerifyTicket {
            sequence: self.next_sequence(),
        }
    }

    /// Highest sequence number handed out so far.
    #[must_use]
    pub const fn last_issued(&self) -> u64 {
        self.last_issued
    }

    const fn next_sequence(&mut self) -> u64 {
        self.last_issued += 1;
        self.last_issued
    }
}
