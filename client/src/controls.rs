//! Which actions are available in the current state.

use serde::Serialize;

use evote_contract::LedgerCall;
use evote_types::Role;

use crate::sync::Snapshot;

/// Enabled state of each action control.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SessionControls {
    pub start: bool,
    pub end: bool,
    pub toggle_hide: bool,
    pub add_candidate: bool,
    pub register_voter: bool,
    pub vote: bool,
    pub busy: bool,
}

impl SessionControls {
    pub fn derive(snapshot: &Snapshot, role: Option<Role>, busy: bool) -> Self {
        if busy {
            return Self {
                busy,
                ..Self::default()
            };
        }
        let phase = snapshot.phase;
        let admin = role == Some(Role::Administrator);
        let voter = role == Some(Role::Voter);
        Self {
            start: admin && phase.is_pending() && snapshot.candidates.len() >= 2,
            end: admin && phase.is_active(),
            toggle_hide: admin && !phase.is_closed(),
            add_candidate: admin,
            register_voter: admin,
            vote: voter,
            busy,
        }
    }

    /// Refuse a call whose control is disabled, with a reason for the operator.
    ///
    /// Ownership claims are gated by role resolution, not here.
    pub fn check(&self, call: &LedgerCall) -> Result<(), &'static str> {
        if self.busy {
            return Err("Another transaction is in progress");
        }
        let (enabled, reason) = match call {
            LedgerCall::ClaimOwnership => (true, ""),
            LedgerCall::RegisterVoter(_) => (self.register_voter, "Only the Admin can register voters"),
            LedgerCall::AddCandidate(_) => (self.add_candidate, "Only the Admin can add candidates"),
            LedgerCall::StartSession => (
                self.start,
                "Voting can start once, with at least two candidates",
            ),
            LedgerCall::EndSession => (self.end, "No voting is on going"),
            LedgerCall::ToggleHideVotes => (self.toggle_hide, "Voting has ended"),
            LedgerCall::CastVote(_) => (self.vote, "Only registered voters can vote"),
        };
        if enabled {
            Ok(())
        } else {
            Err(reason)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evote_types::{Candidate, Identity, SessionPhase};

    fn snapshot(phase: SessionPhase, candidates: usize) -> Snapshot {
        Snapshot {
            phase,
            candidates: (0..candidates)
                .map(|i| Candidate::new(i as u32, Identity::new(format!("0xc{i}")).unwrap(), 0))
                .collect(),
            ..Snapshot::default()
        }
    }

    #[test]
    fn start_needs_pending_and_two_candidates() {
        let admin = Some(Role::Administrator);
        assert!(!SessionControls::derive(&snapshot(SessionPhase::PENDING, 1), admin, false).start);
        assert!(SessionControls::derive(&snapshot(SessionPhase::PENDING, 2), admin, false).start);
        assert!(!SessionControls::derive(&snapshot(SessionPhase::ACTIVE, 2), admin, false).start);
    }

    #[test]
    fn closed_session_locks_admin_controls() {
        let c = SessionControls::derive(&snapshot(SessionPhase::CLOSED, 2), Some(Role::Administrator), false);
        assert!(!c.start && !c.end && !c.toggle_hide);
        assert!(c.register_voter && c.add_candidate);
    }

    #[test]
    fn vote_follows_role_not_phase() {
        let active = snapshot(SessionPhase::ACTIVE, 2);
        assert!(SessionControls::derive(&active, Some(Role::Voter), false).vote);
        assert!(!SessionControls::derive(&active, Some(Role::Administrator), false).vote);
        let closed = SessionControls::derive(&snapshot(SessionPhase::CLOSED, 2), Some(Role::Voter), false);
        assert!(closed.check(&LedgerCall::CastVote(0)).is_ok());
    }

    #[test]
    fn busy_disables_everything() {
        let c = SessionControls::derive(&snapshot(SessionPhase::ACTIVE, 2), Some(Role::Administrator), true);
        assert_eq!(c.check(&LedgerCall::EndSession), Err("Another transaction is in progress"));
        assert_eq!(c.check(&LedgerCall::ClaimOwnership), Err("Another transaction is in progress"));
    }

    #[test]
    fn refusal_reasons() {
        let c = SessionControls::derive(&snapshot(SessionPhase::PENDING, 0), Some(Role::Administrator), false);
        assert_eq!(c.check(&LedgerCall::EndSession), Err("No voting is on going"));
        assert!(c.check(&LedgerCall::ToggleHideVotes).is_ok());
        assert_eq!(c.check(&LedgerCall::CastVote(0)), Err("Only registered voters can vote"));
    }
}
