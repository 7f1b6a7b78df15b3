//! Single-flight transaction orchestration.
//!
//! At most one mutating call is in flight per orchestrator. The busy flag is
//! published on a `watch` channel so front ends can grey out their controls,
//! and it is cleared by a drop guard so an abandoned future releases it too.

use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

use evote_classifier::{classify_error, UserMessage};
use evote_contract::{ElectionLedger, LedgerCall, Receipt};

use crate::sync::{Snapshot, SyncReport, Synchronizer};

/// Notice shown after a confirmed transaction.
pub const SUCCESS_NOTICE: &str = "Transaction successful!";

#[derive(Clone, Debug, PartialEq)]
pub enum TxOutcome {
    /// Confirmed, followed by a fresh read of the chain.
    Confirmed { receipt: Receipt, report: SyncReport },
    /// Rejected, cancelled or lost; one message for the operator.
    Failed(UserMessage),
    /// Another call is still in flight; nothing was submitted.
    Busy,
}

impl TxOutcome {
    /// The notification to show, if any.
    pub fn notice(&self) -> Option<&str> {
        match self {
            Self::Confirmed { .. } => Some(SUCCESS_NOTICE),
            Self::Failed(message) => Some(message.text.as_str()),
            Self::Busy => None,
        }
    }
}

pub struct Orchestrator {
    busy: watch::Sender<bool>,
    synchronizer: Synchronizer,
    settle_delay: Duration,
}

impl Orchestrator {
    pub fn new(synchronizer: Synchronizer, settle_delay: Duration) -> Self {
        let (busy, _) = watch::channel(false);
        Self {
            busy,
            synchronizer,
            settle_delay,
        }
    }

    /// Observe the busy flag.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.busy.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        *self.busy.borrow()
    }

    pub fn synchronizer(&self) -> Synchronizer {
        self.synchronizer
    }

    /// Submit `call`, wait for it, then re-read the chain.
    ///
    /// Never returns an error: failures are classified into a single
    /// [`UserMessage`].
    pub async fn perform(&self, ledger: &dyn ElectionLedger, call: LedgerCall, prior: &Snapshot) -> TxOutcome {
        let Some(_guard) = self.try_acquire() else {
            info!(%call, "transaction already in flight, ignoring");
            return TxOutcome::Busy;
        };

        let caller = ledger.caller();
        info!(%caller, %call, "submitting transaction");
        let receipt = match ledger.submit(call.clone()).await {
            Ok(pending) => {
                info!(tx_hash = %pending.tx_hash, "awaiting confirmation");
                ledger.wait_for_confirmation(pending).await
            }
            Err(e) => Err(e),
        };

        let receipt = match receipt {
            Ok(receipt) => receipt,
            Err(e) => {
                let message = classify_error(&e);
                if message.is_cancellation() {
                    info!(%call, "transaction cancelled in wallet");
                } else {
                    warn!(%call, error = %e, notice = %message, "transaction failed");
                }
                return TxOutcome::Failed(message);
            }
        };
        info!(tx_hash = %receipt.tx_hash, block = ?receipt.block_number, "transaction confirmed");

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
        let report = self.synchronizer.refresh(ledger, prior).await;
        TxOutcome::Confirmed { receipt, report }
    }

    fn try_acquire(&self) -> Option<BusyGuard<'_>> {
        let acquired = self.busy.send_if_modified(|busy| {
            if *busy {
                false
            } else {
                *busy = true;
                true
            }
        });
        acquired.then(|| BusyGuard { busy: &self.busy })
    }
}

/// Clears the busy flag when dropped.
struct BusyGuard<'a> {
    busy: &'a watch::Sender<bool>,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.busy.send_replace(false);
    }
}
