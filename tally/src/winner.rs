//! Winner-or-tie computation.

use serde::Serialize;

use evote_types::{Candidate, SessionPhase, WinnerResult};

/// Every candidate sharing the maximum vote count, in ordinal order.
///
/// Returns `None` for an empty candidate list: no winner can be computed.
pub fn compute_winner(candidates: &[Candidate]) -> Option<WinnerResult> {
    let max = candidates.iter().map(|c| c.vote_count).max()?;
    let mut leaders: Vec<&Candidate> = candidates.iter().filter(|c| c.vote_count == max).collect();
    leaders.sort_by_key(|c| c.ordinal);
    Some(WinnerResult {
        candidates: leaders.into_iter().map(|c| c.address.clone()).collect(),
        vote_count: max,
    })
}

/// [`compute_winner`], but only once the session has ended.
pub fn winner_for(phase: SessionPhase, candidates: &[Candidate]) -> Option<WinnerResult> {
    if !phase.ended {
        return None;
    }
    compute_winner(candidates)
}

/// What the results panel should show.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum WinnerStatus {
    NotStarted,
    InProgress,
    /// Ended, but the winner is not readable yet.
    AwaitingResult,
    Decided(WinnerResult),
}

impl WinnerStatus {
    pub fn from_snapshot(phase: SessionPhase, winner: Option<&WinnerResult>) -> Self {
        match (phase.ended, winner) {
            (true, Some(winner)) => Self::Decided(winner.clone()),
            (true, None) => Self::AwaitingResult,
            (false, _) if phase.started => Self::InProgress,
            (false, _) => Self::NotStarted,
        }
    }

    /// Explanatory line for undecided states.
    pub fn pending_message(&self) -> Option<&'static str> {
        match self {
            Self::NotStarted => Some("Voting has not started yet. Stay tuned!"),
            Self::InProgress => {
                Some("Voting is still in progress. Please wait until the election ends.")
            }
            Self::AwaitingResult => Some("Processing results..."),
            Self::Decided(_) => None,
        }
    }
}
