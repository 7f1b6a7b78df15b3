//! Vote-cast events.

use serde::{Deserialize, Serialize};

use crate::address::Identity;
use crate::time::Timestamp;

/// One entry of the ledger's append-only vote log.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoteRecord {
    pub voter: Identity,
    pub candidate: Identity,
    pub timestamp: Timestamp,
}
