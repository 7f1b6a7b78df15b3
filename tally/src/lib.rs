//! Derived election results.
//!
//! Everything here is a pure function of ledger-read state: no I/O, no
//! mutation of inputs. The ledger remains the only source of truth; these
//! views are recomputed from every fresh snapshot.

pub mod distribution;
pub mod history;
pub mod winner;

pub use distribution::{CandidateShare, VoteDistribution};
pub use history::{order_history, HiddenReason, HistoryEntry, HistoryView};
pub use winner::{compute_winner, winner_for, WinnerStatus};
