//! Nullable infrastructure for deterministic testing.
//!
//! Every external collaborator of the client (the election contract, the
//! wallet provider, the clock) has an in-memory stand-in here that:
//! - enforces the same rules and emits the same rejection texts
//! - can be steered programmatically (fault injection, scripted answers)
//! - never touches the network
//!
//! Usage: swap the real gateway connector and wallet for these in tests.

pub mod clock;
pub mod ledger;
pub mod wallet;

pub use clock::NullClock;
pub use ledger::{FailureShape, NullConnector, NullLedger, NullLedgerHandle, ReadKind};
pub use wallet::NullWallet;
