//! Fundamental types for the evote client.
//!
//! This crate defines the election entities shared by every other crate in the
//! workspace: identities, ownership, session phase, candidates, vote records and
//! the derived winner result. The ledger owns all of them except
//! [`WinnerResult`]; the client only ever holds read copies.

pub mod address;
pub mod candidate;
pub mod error;
pub mod record;
pub mod role;
pub mod state;
pub mod time;
pub mod winner;

pub use address::Identity;
pub use candidate::{Candidate, Ordinal};
pub use error::TypesError;
pub use record::VoteRecord;
pub use role::Role;
pub use state::{OwnershipState, PhaseKind, SessionPhase, Visibility};
pub use time::Timestamp;
pub use winner::WinnerResult;
