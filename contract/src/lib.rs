//! Ledger boundary for the evote client.
//!
//! The election contract is an external collaborator. This crate describes the
//! operations the client consumes ([`ElectionLedger`]), how a ledger handle is
//! bound to a wallet identity ([`LedgerConnector`]), the wallet provider
//! contract ([`WalletProvider`]), and the heterogeneous failure payloads that
//! come back across the boundary ([`RawFailure`]).
//!
//! [`RpcLedger`] talks to a JSON-over-HTTP gateway that fronts the contract.

pub mod call;
pub mod error;
pub mod failure;
pub mod ledger;
pub mod rpc;
pub mod wallet;

pub use call::{LedgerCall, PendingTx, Receipt};
pub use error::LedgerError;
pub use failure::{FailureCode, ProviderError, ProviderInfo, RawFailure};
pub use ledger::{ElectionLedger, LedgerConnector};
pub use rpc::{RpcConnector, RpcLedger};
pub use wallet::{StaticWallet, WalletEvent, WalletProvider};
