//! Mutating contract calls and their confirmation artifacts.

use serde::{Deserialize, Serialize};
use std::fmt;

use evote_types::{Identity, Ordinal};

/// A state-changing request submitted to the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "args", rename_all = "snake_case")]
pub enum LedgerCall {
    /// Bind the caller as administrator while ownership is unclaimed.
    ClaimOwnership,
    RegisterVoter(Identity),
    AddCandidate(Identity),
    StartSession,
    EndSession,
    ToggleHideVotes,
    CastVote(Ordinal),
}

impl LedgerCall {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ClaimOwnership => "claim_ownership",
            Self::RegisterVoter(_) => "register_voter",
            Self::AddCandidate(_) => "add_candidate",
            Self::StartSession => "start_session",
            Self::EndSession => "end_session",
            Self::ToggleHideVotes => "toggle_hide_votes",
            Self::CastVote(_) => "cast_vote",
        }
    }

    /// Calls only the administrator may make.
    pub fn is_administrative(&self) -> bool {
        !matches!(self, Self::ClaimOwnership | Self::CastVote(_))
    }
}

impl fmt::Display for LedgerCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RegisterVoter(id) | Self::AddCandidate(id) => write!(f, "{}({id})", self.name()),
            Self::CastVote(ordinal) => write!(f, "{}({ordinal})", self.name()),
            _ => f.write_str(self.name()),
        }
    }
}

/// A submitted, not yet confirmed transaction.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingTx {
    pub tx_hash: String,
}

/// Confirmation of an included transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_hash: String,
    #[serde(default)]
    pub block_number: Option<u64>,
}
