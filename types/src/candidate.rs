//! Candidates registered on the ledger.

use serde::{Deserialize, Serialize};

use crate::address::Identity;

/// Stable positional reference assigned by the ledger at registration time.
pub type Ordinal = u32;

/// A candidate and its current tally.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    /// Registration order; the reference used when casting a vote.
    pub ordinal: Ordinal,
    pub address: Identity,
    pub vote_count: u64,
}

impl Candidate {
    pub fn new(ordinal: Ordinal, address: Identity, vote_count: u64) -> Self {
        Self {
            ordinal,
            address,
            vote_count,
        }
    }
}
