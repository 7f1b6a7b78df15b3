//! Nullable wallet provider with scripted answers.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use evote_contract::{LedgerError, RawFailure, WalletProvider};
use evote_types::Identity;

/// A wallet that answers account requests from a script.
///
/// Scripted answers are consumed first; once the script is empty, every
/// request returns the default accounts.
pub struct NullWallet {
    accounts: Mutex<Vec<Identity>>,
    script: Mutex<VecDeque<Result<Vec<Identity>, LedgerError>>>,
    requests: AtomicUsize,
}

impl NullWallet {
    pub fn new(accounts: Vec<Identity>) -> Self {
        Self {
            accounts: Mutex::new(accounts),
            script: Mutex::new(VecDeque::new()),
            requests: AtomicUsize::new(0),
        }
    }

    /// A wallet with no authorized accounts.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Switch the default selection, as the operator would in the wallet UI.
    pub fn select(&self, accounts: Vec<Identity>) {
        *self.accounts.lock().unwrap_or_else(|p| p.into_inner()) = accounts;
    }

    /// The operator dismisses the next prompt.
    pub fn cancel_next(&self) {
        self.push(Err(LedgerError::Failure(
            RawFailure::user_rejected().with_short_message("User rejected the request."),
        )));
    }

    pub fn fail_next(&self, error: LedgerError) {
        self.push(Err(error));
    }

    pub fn respond_next(&self, accounts: Vec<Identity>) {
        self.push(Ok(accounts));
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn push(&self, answer: Result<Vec<Identity>, LedgerError>) {
        self.script
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push_back(answer);
    }
}

#[async_trait]
impl WalletProvider for NullWallet {
    async fn request_accounts(&self) -> Result<Vec<Identity>, LedgerError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let scripted = self
            .script
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .pop_front();
        match scripted {
            Some(answer) => answer,
            None => Ok(self.accounts.lock().unwrap_or_else(|p| p.into_inner()).clone()),
        }
    }
}
