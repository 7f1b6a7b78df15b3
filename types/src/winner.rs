//! Derived election outcome.

use serde::{Deserialize, Serialize};

use crate::address::Identity;

/// The winning candidate set and their shared vote count.
///
/// Never stored on the client; derived from tallies once the session has
/// ended. More than one member means a tie.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WinnerResult {
    /// Winners in candidate ordinal order.
    pub candidates: Vec<Identity>,
    pub vote_count: u64,
}

impl WinnerResult {
    pub fn is_tie(&self) -> bool {
        self.candidates.len() > 1
    }

    /// The single outright winner, if there is no tie.
    pub fn outright(&self) -> Option<&Identity> {
        match self.candidates.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tie_detection() {
        let a = Identity::new("0xa").unwrap();
        let b = Identity::new("0xb").unwrap();
        let single = WinnerResult {
            candidates: vec![a.clone()],
            vote_count: 3,
        };
        assert!(!single.is_tie());
        assert_eq!(single.outright(), Some(&a));

        let tie = WinnerResult {
            candidates: vec![a, b],
            vote_count: 3,
        };
        assert!(tie.is_tie());
        assert_eq!(tie.outright(), None);
    }
}
