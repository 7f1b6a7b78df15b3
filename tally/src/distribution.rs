//! Per-candidate vote shares for charts.

use serde::Serialize;

use evote_types::{Candidate, Identity, Ordinal, SessionPhase};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CandidateShare {
    pub ordinal: Ordinal,
    pub address: Identity,
    pub votes: u64,
    /// Share of all votes cast, 0.0..=100.0. Zero when no votes exist.
    pub percent: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VoteDistribution {
    pub total: u64,
    pub shares: Vec<CandidateShare>,
}

impl VoteDistribution {
    pub fn from_candidates(candidates: &[Candidate]) -> Self {
        let total: u64 = candidates.iter().map(|c| c.vote_count).sum();
        let shares = candidates
            .iter()
            .map(|c| CandidateShare {
                ordinal: c.ordinal,
                address: c.address.clone(),
                votes: c.vote_count,
                percent: if total == 0 {
                    0.0
                } else {
                    c.vote_count as f64 * 100.0 / total as f64
                },
            })
            .collect();
        Self { total, shares }
    }

    /// `None` while votes are effectively hidden.
    pub fn visible(candidates: &[Candidate], phase: SessionPhase, hide_votes: bool) -> Option<Self> {
        (!phase.visibility(hide_votes).is_hidden()).then(|| Self::from_candidates(candidates))
    }
}
