//! Wallet provider contract.
//!
//! The provider owns account selection and signing. The client only asks it
//! for accounts and reacts to the events it emits.

use async_trait::async_trait;

use evote_types::Identity;

use crate::error::LedgerError;

/// Notifications pushed by the wallet provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WalletEvent {
    /// The selected accounts changed. An empty list means the wallet
    /// disconnected the site.
    AccountsChanged(Vec<Identity>),
    Disconnected,
}

#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the operator to grant access and select accounts.
    ///
    /// A refusal comes back as a [`LedgerError::Failure`] carrying the
    /// user-rejection code.
    async fn request_accounts(&self) -> Result<Vec<Identity>, LedgerError>;
}

/// A provider with a fixed, pre-authorized account.
///
/// Used by the command-line front end, where the gateway signs for the
/// configured identity.
#[derive(Clone, Debug)]
pub struct StaticWallet {
    account: Option<Identity>,
}

impl StaticWallet {
    pub fn new(account: Option<Identity>) -> Self {
        Self { account }
    }
}

#[async_trait]
impl WalletProvider for StaticWallet {
    async fn request_accounts(&self) -> Result<Vec<Identity>, LedgerError> {
        Ok(self.account.iter().cloned().collect())
    }
}
