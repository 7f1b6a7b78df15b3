//! Session phase, ownership and vote visibility.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::address::Identity;
use crate::error::TypesError;

/// The election session lifecycle as reported by the ledger.
///
/// `ended = true` is terminal. The ledger never produces
/// `started = false, ended = true`; if it is observed anyway it classifies
/// as [`PhaseKind::Closed`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionPhase {
    pub started: bool,
    pub ended: bool,
}

/// The three reachable lifecycle positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseKind {
    /// Candidates may still be added; no votes accepted.
    Pending,
    /// Votes are accepted.
    Active,
    /// Immutable: no transitions, no votes.
    Closed,
}

impl SessionPhase {
    pub const PENDING: Self = Self {
        started: false,
        ended: false,
    };
    pub const ACTIVE: Self = Self {
        started: true,
        ended: false,
    };
    pub const CLOSED: Self = Self {
        started: true,
        ended: true,
    };

    pub fn new(started: bool, ended: bool) -> Self {
        Self { started, ended }
    }

    pub fn kind(&self) -> PhaseKind {
        match (self.started, self.ended) {
            (false, false) => PhaseKind::Pending,
            (true, false) => PhaseKind::Active,
            (_, true) => PhaseKind::Closed,
        }
    }

    /// Whether this is the unreachable `started = false, ended = true` combination.
    pub fn is_anomalous(&self) -> bool {
        !self.started && self.ended
    }

    /// Map the anomalous combination onto [`SessionPhase::CLOSED`].
    pub fn normalized(self) -> Self {
        if self.is_anomalous() {
            Self::CLOSED
        } else {
            self
        }
    }

    pub fn is_pending(&self) -> bool {
        self.kind() == PhaseKind::Pending
    }

    pub fn is_active(&self) -> bool {
        self.kind() == PhaseKind::Active
    }

    pub fn is_closed(&self) -> bool {
        self.kind() == PhaseKind::Closed
    }

    /// Effective vote visibility given the stored hide flag.
    ///
    /// A closed session is always visible.
    pub fn visibility(&self, hide_votes: bool) -> Visibility {
        if hide_votes && !self.is_closed() {
            Visibility::Hidden
        } else {
            Visibility::Visible
        }
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Effective visibility of tallies and history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    Visible,
    Hidden,
}

impl Visibility {
    pub fn is_hidden(&self) -> bool {
        matches!(self, Self::Hidden)
    }
}

/// Who, if anyone, administers the election.
///
/// Transitions exactly once from `Unclaimed` to `Owned` and never back.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OwnershipState {
    #[default]
    Unclaimed,
    Owned(Identity),
}

impl OwnershipState {
    /// Interpret an owner address read from the ledger.
    pub fn from_owner(owner: Identity) -> Self {
        if owner.is_zero() {
            Self::Unclaimed
        } else {
            Self::Owned(owner)
        }
    }

    pub fn owner(&self) -> Option<&Identity> {
        match self {
            Self::Unclaimed => None,
            Self::Owned(owner) => Some(owner),
        }
    }

    pub fn is_unclaimed(&self) -> bool {
        matches!(self, Self::Unclaimed)
    }

    pub fn is_owned_by(&self, identity: &Identity) -> bool {
        self.owner().is_some_and(|owner| owner == identity)
    }

    /// Apply a claim. Fails once an owner is bound.
    pub fn claim(&self, claimant: &Identity) -> Result<Self, TypesError> {
        match self {
            Self::Owned(owner) => Err(TypesError::AlreadyOwned(owner.to_string())),
            Self::Unclaimed if claimant.is_zero() => Err(TypesError::ZeroClaimant),
            Self::Unclaimed => Ok(Self::Owned(claimant.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> Identity {
        Identity::new(s).unwrap()
    }

    #[test]
    fn phase_kinds() {
        assert_eq!(SessionPhase::PENDING.kind(), PhaseKind::Pending);
        assert_eq!(SessionPhase::ACTIVE.kind(), PhaseKind::Active);
        assert_eq!(SessionPhase::CLOSED.kind(), PhaseKind::Closed);
        assert_eq!(SessionPhase::new(false, true).kind(), PhaseKind::Closed);
    }

    #[test]
    fn anomalous_phase_normalizes_to_closed() {
        let odd = SessionPhase::new(false, true);
        assert!(odd.is_anomalous());
        assert_eq!(odd.normalized(), SessionPhase::CLOSED);
        assert_eq!(SessionPhase::ACTIVE.normalized(), SessionPhase::ACTIVE);
    }

    #[test]
    fn closed_session_is_always_visible() {
        assert_eq!(SessionPhase::CLOSED.visibility(true), Visibility::Visible);
        assert_eq!(SessionPhase::ACTIVE.visibility(true), Visibility::Hidden);
        assert_eq!(SessionPhase::PENDING.visibility(true), Visibility::Hidden);
        assert_eq!(SessionPhase::ACTIVE.visibility(false), Visibility::Visible);
    }

    #[test]
    fn zero_owner_is_unclaimed() {
        assert_eq!(
            OwnershipState::from_owner(Identity::zero()),
            OwnershipState::Unclaimed
        );
        let owned = OwnershipState::from_owner(id("0xA1"));
        assert!(owned.is_owned_by(&id("0xa1")));
        assert!(!owned.is_owned_by(&id("0xb2")));
    }

    #[test]
    fn claim_happens_once() {
        let owned = OwnershipState::Unclaimed.claim(&id("0xa1")).unwrap();
        assert_eq!(owned, OwnershipState::Owned(id("0xa1")));
        assert!(matches!(
            owned.claim(&id("0xb2")),
            Err(TypesError::AlreadyOwned(_))
        ));
    }

    #[test]
    fn zero_address_cannot_claim() {
        assert_eq!(
            OwnershipState::Unclaimed.claim(&Identity::zero()),
            Err(TypesError::ZeroClaimant)
        );
    }
}
