//! The election contract's operation set, as consumed by the client.

use async_trait::async_trait;
use std::sync::Arc;

use evote_types::{Candidate, Identity, OwnershipState, Ordinal, SessionPhase, VoteRecord, WinnerResult};

use crate::call::{LedgerCall, PendingTx, Receipt};
use crate::error::LedgerError;

/// An authenticated binding between one wallet identity and the ledger.
///
/// Every mutating call is made on behalf of [`ElectionLedger::caller`]. A
/// handle is never reused for a different identity; reconnect instead.
#[async_trait]
pub trait ElectionLedger: Send + Sync {
    /// The identity this handle acts for.
    fn caller(&self) -> &Identity;

    /// Current owner, or the zero address when unclaimed.
    async fn read_owner(&self) -> Result<Identity, LedgerError>;

    async fn is_voter_registered(&self, identity: &Identity) -> Result<bool, LedgerError>;

    async fn read_phase(&self) -> Result<SessionPhase, LedgerError>;

    async fn read_hide_votes(&self) -> Result<bool, LedgerError>;

    /// Bulk candidate read. May be [`LedgerError::Unsupported`].
    async fn read_all_candidates(&self) -> Result<Vec<Candidate>, LedgerError>;

    /// Indexed candidate read; fails past the last registered ordinal.
    async fn read_candidate_at(&self, ordinal: Ordinal) -> Result<Candidate, LedgerError>;

    async fn read_vote_history(&self) -> Result<Vec<VoteRecord>, LedgerError>;

    /// Winner set and count. Only valid once the session has ended.
    async fn read_winner(&self) -> Result<WinnerResult, LedgerError>;

    /// Submit a mutating call. Returns once the ledger has accepted it for
    /// inclusion; use [`ElectionLedger::wait_for_confirmation`] to await it.
    async fn submit(&self, call: LedgerCall) -> Result<PendingTx, LedgerError>;

    async fn wait_for_confirmation(&self, tx: PendingTx) -> Result<Receipt, LedgerError>;

    /// Owner read interpreted as an [`OwnershipState`].
    async fn read_ownership(&self) -> Result<OwnershipState, LedgerError> {
        Ok(OwnershipState::from_owner(self.read_owner().await?))
    }
}

/// Produces a ledger handle for a wallet identity.
#[async_trait]
pub trait LedgerConnector: Send + Sync {
    async fn connect(&self, identity: &Identity) -> Result<Arc<dyn ElectionLedger>, LedgerError>;
}
