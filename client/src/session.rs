//! A wallet-bound client session.
//!
//! The session owns the current ledger handle and re-creates it whenever the
//! wallet identity changes; the entered role never survives such a change.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use evote_contract::{ElectionLedger, LedgerCall, LedgerConnector, LedgerError, WalletEvent, WalletProvider};
use evote_types::{Identity, Role};

use crate::config::ClientConfig;
use crate::controls::SessionControls;
use crate::orchestrator::{Orchestrator, TxOutcome};
use crate::role::{self, AccessSummary, DenialReason, RoleDecision};
use crate::sync::{Snapshot, SyncReport, Synchronizer};
use crate::ClientError;

pub const CONNECTION_FAILED: &str = "Connection failed";
pub const CLAIM_SUCCESS_NOTICE: &str = "Successfully claimed Admin access!";
pub const CLAIM_FAILED_NOTICE: &str = "Failed to claim admin access.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectOutcome {
    Connected {
        identity: Identity,
        /// `None` when the owner read failed; display only.
        access: Option<AccessSummary>,
    },
    /// The operator dismissed the wallet prompt. Not a failure.
    Cancelled,
    Failed(&'static str),
}

#[derive(Clone, Debug, PartialEq)]
pub enum ClaimOutcome {
    /// A fresh role pass did not offer the claim.
    NotOffered(RoleDecision),
    Submitted(TxOutcome),
}

impl ClaimOutcome {
    /// The notification to show. Failed claims get one fixed notice; the
    /// classified reason stays in the inner [`TxOutcome`].
    pub fn notice(&self) -> Option<&str> {
        match self {
            Self::NotOffered(decision) => Some(decision.message()),
            Self::Submitted(TxOutcome::Confirmed { .. }) => Some(CLAIM_SUCCESS_NOTICE),
            Self::Submitted(TxOutcome::Failed(_)) => Some(CLAIM_FAILED_NOTICE),
            Self::Submitted(TxOutcome::Busy) => None,
        }
    }
}

pub struct Session {
    wallet: Arc<dyn WalletProvider>,
    connector: Arc<dyn LedgerConnector>,
    orchestrator: Orchestrator,
    ledger: Option<Arc<dyn ElectionLedger>>,
    access: Option<AccessSummary>,
    role: Option<Role>,
    snapshot: Snapshot,
}

impl Session {
    pub fn new(
        wallet: Arc<dyn WalletProvider>,
        connector: Arc<dyn LedgerConnector>,
        config: &ClientConfig,
    ) -> Self {
        let synchronizer = Synchronizer::new(config.max_candidate_probe);
        Self {
            wallet,
            connector,
            orchestrator: Orchestrator::new(synchronizer, config.post_confirmation_delay()),
            ledger: None,
            access: None,
            role: None,
            snapshot: Snapshot::default(),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.ledger.as_ref().map(|ledger| ledger.caller())
    }

    pub fn access(&self) -> Option<AccessSummary> {
        self.access
    }

    /// The role granted by the last successful entry.
    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn controls(&self) -> SessionControls {
        SessionControls::derive(&self.snapshot, self.role, self.orchestrator.is_busy())
    }

    pub fn subscribe_busy(&self) -> watch::Receiver<bool> {
        self.orchestrator.subscribe()
    }

    /// Ask the wallet for an account and bind to the first one.
    pub async fn connect_wallet(&mut self) -> ConnectOutcome {
        let accounts = match self.wallet.request_accounts().await {
            Ok(accounts) => accounts,
            Err(e) if e.is_user_cancellation() => {
                info!("wallet connection cancelled by operator");
                return ConnectOutcome::Cancelled;
            }
            Err(e) => {
                warn!(error = %e, "wallet connection failed");
                return ConnectOutcome::Failed(CONNECTION_FAILED);
            }
        };
        let Some(identity) = accounts.into_iter().next() else {
            warn!("wallet returned no accounts");
            return ConnectOutcome::Failed(CONNECTION_FAILED);
        };
        match self.bind(identity.clone()).await {
            Ok(()) => ConnectOutcome::Connected {
                identity,
                access: self.access,
            },
            Err(e) => {
                warn!(%identity, error = %e, "ledger connection failed");
                ConnectOutcome::Failed(CONNECTION_FAILED)
            }
        }
    }

    /// React to a wallet notification.
    ///
    /// On rebinding failure the session is left disconnected.
    pub async fn handle_wallet_event(&mut self, event: WalletEvent) -> Result<(), ClientError> {
        match event {
            WalletEvent::AccountsChanged(accounts) => match accounts.into_iter().next() {
                Some(identity) => {
                    info!(%identity, "wallet account changed");
                    self.bind(identity).await?;
                }
                None => {
                    info!("wallet reported no accounts");
                    self.disconnect();
                }
            },
            WalletEvent::Disconnected => {
                info!("wallet disconnected");
                self.disconnect();
            }
        }
        Ok(())
    }

    /// Forget the identity and everything derived from it.
    pub fn disconnect(&mut self) {
        self.ledger = None;
        self.access = None;
        self.role = None;
        self.snapshot = Snapshot::default();
    }

    /// Attempt to enter with `requested`, re-reading every fact.
    pub async fn enter(&mut self, requested: Role) -> RoleDecision {
        let Some(ledger) = self.ledger.clone() else {
            return RoleDecision::Denied(DenialReason::NoWallet);
        };
        let decision = role::resolve(ledger.as_ref(), requested).await;
        if let RoleDecision::Granted(role) = decision {
            self.role = Some(role);
        }
        decision
    }

    /// Claim the administrator role, if a fresh role pass offers it.
    pub async fn claim_administrator(&mut self) -> Result<ClaimOutcome, ClientError> {
        let ledger = self.current_ledger()?;
        let decision = role::resolve(ledger.as_ref(), Role::Administrator).await;
        if decision != RoleDecision::OfferClaim {
            return Ok(ClaimOutcome::NotOffered(decision));
        }

        let outcome = self
            .orchestrator
            .perform(ledger.as_ref(), LedgerCall::ClaimOwnership, &self.snapshot)
            .await;
        if let TxOutcome::Confirmed { report, .. } = &outcome {
            self.snapshot = report.snapshot.clone();
            self.access = read_access(ledger.as_ref()).await;
        }
        Ok(ClaimOutcome::Submitted(outcome))
    }

    /// Submit a mutating call through the orchestrator.
    pub async fn submit(&mut self, call: LedgerCall) -> Result<TxOutcome, ClientError> {
        let ledger = self.current_ledger()?;
        self.controls().check(&call).map_err(ClientError::Refused)?;
        let outcome = self
            .orchestrator
            .perform(ledger.as_ref(), call, &self.snapshot)
            .await;
        if let TxOutcome::Confirmed { report, .. } = &outcome {
            self.snapshot = report.snapshot.clone();
        }
        Ok(outcome)
    }

    /// Re-read chain state, keeping stale values for failed reads.
    pub async fn refresh(&mut self) -> Result<SyncReport, ClientError> {
        let ledger = self.current_ledger()?;
        let report = self
            .orchestrator
            .synchronizer()
            .refresh(ledger.as_ref(), &self.snapshot)
            .await;
        self.snapshot = report.snapshot.clone();
        Ok(report)
    }

    async fn bind(&mut self, identity: Identity) -> Result<(), LedgerError> {
        self.disconnect();
        let ledger = self.connector.connect(&identity).await?;
        self.access = read_access(ledger.as_ref()).await;
        self.snapshot = self.orchestrator.synchronizer().sync(ledger.as_ref()).await;
        self.ledger = Some(ledger);
        info!(%identity, access = ?self.access, "wallet bound");
        Ok(())
    }

    fn current_ledger(&self) -> Result<Arc<dyn ElectionLedger>, ClientError> {
        self.ledger.clone().ok_or(ClientError::NotConnected)
    }
}

async fn read_access(ledger: &dyn ElectionLedger) -> Option<AccessSummary> {
    match ledger.read_ownership().await {
        Ok(ownership) => Some(AccessSummary::from_ownership(&ownership, ledger.caller())),
        Err(e) => {
            warn!(error = %e, "owner read failed, access summary unavailable");
            None
        }
    }
}
