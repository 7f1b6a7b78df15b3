//! Nullable election ledger: an in-memory contract with the real rules.
//!
//! One [`NullLedger`] is the shared chain state. Each wallet identity talks
//! to it through its own [`NullLedgerHandle`], the same way every browser
//! tab gets its own signer over one deployed contract.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

use evote_contract::{
    ElectionLedger, LedgerCall, LedgerConnector, LedgerError, PendingTx, RawFailure, Receipt,
};
use evote_types::{
    Candidate, Identity, Ordinal, OwnershipState, SessionPhase, Timestamp, VoteRecord,
    WinnerResult,
};

use crate::clock::NullClock;

/// How contract reverts are wrapped before reaching the client.
///
/// Providers disagree on where they put the revert reason; the client has to
/// cope with all of these.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailureShape {
    /// Structured `reason` field.
    #[default]
    Reason,
    /// Nested under `info.error.message`.
    Provider,
    /// `reason="..."` inside a longer message.
    Quoted,
    /// `reverted with reason string '...'` inside a longer message.
    RevertString,
    /// `execution reverted: ...` at the end of a message.
    ExecutionReverted,
}

impl FailureShape {
    fn wrap(self, reason: &str) -> RawFailure {
        match self {
            Self::Reason => RawFailure::from_reason(reason),
            Self::Provider => RawFailure::from_provider(format!("execution reverted: {reason}")),
            Self::Quoted => RawFailure::from_message(format!(
                "execution reverted (action=\"estimateGas\", reason=\"{reason}\", code=CALL_EXCEPTION)"
            )),
            Self::RevertString => RawFailure::from_message(format!(
                "Error: VM Exception while processing transaction: reverted with reason string '{reason}'"
            )),
            Self::ExecutionReverted => {
                RawFailure::from_message(format!("execution reverted: {reason}"))
            }
        }
    }
}

/// Read operations that can be counted or made to fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReadKind {
    Owner,
    Registration,
    Phase,
    HideVotes,
    AllCandidates,
    CandidateAt,
    History,
    Winner,
}

#[derive(Default)]
struct Contract {
    ownership: OwnershipState,
    voters: HashSet<Identity>,
    candidates: Vec<Candidate>,
    voted: HashSet<Identity>,
    history: Vec<VoteRecord>,
    phase: SessionPhase,
    hide_votes: bool,
}

impl Contract {
    fn owner(&self) -> Option<&Identity> {
        self.ownership.owner()
    }

    fn is_owner(&self, caller: &Identity) -> bool {
        self.ownership.is_owned_by(caller)
    }

    /// Apply `call` on behalf of `caller`, or return the revert reason.
    fn apply(&mut self, caller: &Identity, call: &LedgerCall, now: Timestamp) -> Result<(), &'static str> {
        match call {
            LedgerCall::ClaimOwnership => {
                if !self.ownership.is_unclaimed() {
                    return Err("Ownership has already been claimed");
                }
                if self.voters.contains(caller) {
                    return Err("Registered voters cannot claim ownership");
                }
                self.ownership = self
                    .ownership
                    .claim(caller)
                    .map_err(|_| "Ownership has already been claimed")?;
            }
            LedgerCall::RegisterVoter(voter) => {
                if !self.is_owner(caller) {
                    return Err("Only owner can register voters");
                }
                if self.owner() == Some(voter) {
                    return Err("Owner cannot be registered as voter");
                }
                if !self.voters.insert(voter.clone()) {
                    return Err("Voter already registered");
                }
            }
            LedgerCall::AddCandidate(address) => {
                if !self.is_owner(caller) {
                    return Err("You aren't the owner, Only owner has the right to add candidates");
                }
                if self.phase.started || self.phase.ended {
                    return Err("Owner was not allowed to add candidates during voting started");
                }
                if self.candidates.iter().any(|c| &c.address == address) {
                    return Err("The candidate has been added");
                }
                let ordinal = self.candidates.len() as Ordinal;
                self.candidates.push(Candidate::new(ordinal, address.clone(), 0));
            }
            LedgerCall::StartSession => {
                if !self.is_owner(caller) {
                    return Err("You aren't the owner, Only owner has the right to initiate the voting");
                }
                if self.phase.ended {
                    return Err("Voting has ended and cannot be restarted");
                }
                if self.phase.started {
                    return Err("Voting has started");
                }
                if self.candidates.len() < 2 {
                    return Err("Candidates must be more than one or at least two to start the voting");
                }
                self.phase.started = true;
            }
            LedgerCall::EndSession => {
                if !self.is_owner(caller) {
                    return Err("You aren't the owner, Only owner has the right to initiate the voting");
                }
                if !self.phase.is_active() {
                    return Err("No voting is on going");
                }
                self.phase.ended = true;
            }
            LedgerCall::ToggleHideVotes => {
                if !self.is_owner(caller) {
                    return Err("Only owner can toggle hide votes");
                }
                if self.phase.ended {
                    return Err("Voting has ended");
                }
                self.hide_votes = !self.hide_votes;
            }
            LedgerCall::CastVote(ordinal) => {
                if self.is_owner(caller) {
                    return Err("Owner has no right to vote");
                }
                if !self.voters.contains(caller) {
                    return Err("You are not registered to vote");
                }
                if !self.phase.is_active() {
                    return Err("Voting has not started or Voting has ended");
                }
                if self.voted.contains(caller) {
                    return Err("All voters are only allowed to vote once");
                }
                let candidate = self
                    .candidates
                    .get_mut(*ordinal as usize)
                    .ok_or("Candidate not found")?;
                candidate.vote_count += 1;
                let record = VoteRecord {
                    voter: caller.clone(),
                    candidate: candidate.address.clone(),
                    timestamp: now,
                };
                self.voted.insert(caller.clone());
                self.history.push(record);
            }
        }
        Ok(())
    }

    fn winner(&self) -> Result<WinnerResult, &'static str> {
        if !self.phase.ended {
            return Err("Voting has not ended");
        }
        let max = self.candidates.iter().map(|c| c.vote_count).max().unwrap_or(0);
        Ok(WinnerResult {
            candidates: self
                .candidates
                .iter()
                .filter(|c| c.vote_count == max)
                .map(|c| c.address.clone())
                .collect(),
            vote_count: max,
        })
    }
}

/// Test steering knobs.
struct Faults {
    shape: FailureShape,
    bulk_reads: bool,
    failing_reads: HashSet<ReadKind>,
    phase_override: Option<SessionPhase>,
    submit_failures: VecDeque<LedgerError>,
    confirmation_failures: VecDeque<LedgerError>,
}

impl Default for Faults {
    fn default() -> Self {
        Self {
            shape: FailureShape::default(),
            bulk_reads: true,
            failing_reads: HashSet::new(),
            phase_override: None,
            submit_failures: VecDeque::new(),
            confirmation_failures: VecDeque::new(),
        }
    }
}

struct Shared {
    contract: Mutex<Contract>,
    faults: Mutex<Faults>,
    reads: Mutex<HashMap<ReadKind, usize>>,
    submissions: Mutex<Vec<(Identity, LedgerCall)>>,
    clock: NullClock,
    next_tx: AtomicU64,
    confirmations_open: watch::Sender<bool>,
}

/// In-memory election contract for testing.
///
/// Cloning shares the same state.
#[derive(Clone)]
pub struct NullLedger {
    shared: Arc<Shared>,
}

impl NullLedger {
    pub fn new() -> Self {
        let (confirmations_open, _) = watch::channel(true);
        Self {
            shared: Arc::new(Shared {
                contract: Mutex::new(Contract::default()),
                faults: Mutex::new(Faults::default()),
                reads: Mutex::new(HashMap::new()),
                submissions: Mutex::new(Vec::new()),
                clock: NullClock::default(),
                next_tx: AtomicU64::new(1),
                confirmations_open,
            }),
        }
    }

    /// A handle that signs as `caller`.
    pub fn handle(&self, caller: &Identity) -> NullLedgerHandle {
        NullLedgerHandle {
            caller: caller.clone(),
            ledger: self.clone(),
        }
    }

    pub fn connector(&self) -> NullConnector {
        NullConnector {
            ledger: self.clone(),
            fail_next: Mutex::new(None),
            connections: AtomicUsize::new(0),
        }
    }

    pub fn clock(&self) -> &NullClock {
        &self.shared.clock
    }

    /// Apply a call directly, bypassing submission and fault injection.
    /// Meant for arranging state before the interesting part of a test.
    pub fn apply(&self, caller: &Identity, call: LedgerCall) -> Result<(), String> {
        let now = self.shared.clock.now();
        self.contract()
            .apply(caller, &call, now)
            .map_err(str::to_string)
    }

    // ----- steering -----

    pub fn set_failure_shape(&self, shape: FailureShape) {
        self.faults().shape = shape;
    }

    /// When disabled, bulk candidate reads answer `Unsupported`.
    pub fn set_bulk_reads(&self, enabled: bool) {
        self.faults().bulk_reads = enabled;
    }

    /// Make reads of `kind` fail with a transport error until cleared.
    pub fn fail_reads(&self, kind: ReadKind) {
        self.faults().failing_reads.insert(kind);
    }

    pub fn clear_read_failures(&self) {
        self.faults().failing_reads.clear();
    }

    /// Report this phase instead of the contract's own.
    pub fn override_phase(&self, phase: Option<SessionPhase>) {
        self.faults().phase_override = phase;
    }

    /// The next submission fails with `error` before reaching the contract.
    pub fn reject_next_submission(&self, error: LedgerError) {
        self.faults().submit_failures.push_back(error);
    }

    /// The next confirmation wait fails with `error`. The call stays applied.
    pub fn fail_next_confirmation(&self, error: LedgerError) {
        self.faults().confirmation_failures.push_back(error);
    }

    /// Hold every confirmation wait until [`NullLedger::release_confirmations`].
    pub fn hold_confirmations(&self) {
        self.shared.confirmations_open.send_replace(false);
    }

    pub fn release_confirmations(&self) {
        self.shared.confirmations_open.send_replace(true);
    }

    // ----- inspection -----

    pub fn read_count(&self, kind: ReadKind) -> usize {
        lock(&self.shared.reads).get(&kind).copied().unwrap_or(0)
    }

    pub fn total_reads(&self) -> usize {
        lock(&self.shared.reads).values().sum()
    }

    /// Every call that reached the contract through `submit`, in order.
    pub fn submissions(&self) -> Vec<(Identity, LedgerCall)> {
        lock(&self.shared.submissions).clone()
    }

    pub fn candidates(&self) -> Vec<Candidate> {
        self.contract().candidates.clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.contract().phase
    }

    pub fn hide_votes(&self) -> bool {
        self.contract().hide_votes
    }

    pub fn history(&self) -> Vec<VoteRecord> {
        self.contract().history.clone()
    }

    fn contract(&self) -> MutexGuard<'_, Contract> {
        lock(&self.shared.contract)
    }

    fn faults(&self) -> MutexGuard<'_, Faults> {
        lock(&self.shared.faults)
    }

    fn begin_read(&self, kind: ReadKind) -> Result<(), LedgerError> {
        *lock(&self.shared.reads).entry(kind).or_insert(0) += 1;
        if self.faults().failing_reads.contains(&kind) {
            return Err(LedgerError::Transport(format!("{kind:?} read failed")));
        }
        Ok(())
    }

    fn revert(&self, reason: &str) -> LedgerError {
        LedgerError::Failure(self.faults().shape.wrap(reason))
    }
}

impl Default for NullLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// Poisoning only happens after a panic in another test thread; keep going.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// One identity's view of a [`NullLedger`].
#[derive(Clone)]
pub struct NullLedgerHandle {
    caller: Identity,
    ledger: NullLedger,
}

#[async_trait]
impl ElectionLedger for NullLedgerHandle {
    fn caller(&self) -> &Identity {
        &self.caller
    }

    async fn read_owner(&self) -> Result<Identity, LedgerError> {
        self.ledger.begin_read(ReadKind::Owner)?;
        Ok(self
            .ledger
            .contract()
            .owner()
            .cloned()
            .unwrap_or_else(Identity::zero))
    }

    async fn is_voter_registered(&self, identity: &Identity) -> Result<bool, LedgerError> {
        self.ledger.begin_read(ReadKind::Registration)?;
        Ok(self.ledger.contract().voters.contains(identity))
    }

    async fn read_phase(&self) -> Result<SessionPhase, LedgerError> {
        self.ledger.begin_read(ReadKind::Phase)?;
        if let Some(phase) = self.ledger.faults().phase_override {
            return Ok(phase);
        }
        Ok(self.ledger.contract().phase)
    }

    async fn read_hide_votes(&self) -> Result<bool, LedgerError> {
        self.ledger.begin_read(ReadKind::HideVotes)?;
        Ok(self.ledger.contract().hide_votes)
    }

    async fn read_all_candidates(&self) -> Result<Vec<Candidate>, LedgerError> {
        self.ledger.begin_read(ReadKind::AllCandidates)?;
        if !self.ledger.faults().bulk_reads {
            return Err(LedgerError::Unsupported("get_all_candidates"));
        }
        Ok(self.ledger.contract().candidates.clone())
    }

    async fn read_candidate_at(&self, ordinal: Ordinal) -> Result<Candidate, LedgerError> {
        self.ledger.begin_read(ReadKind::CandidateAt)?;
        self.ledger
            .contract()
            .candidates
            .get(ordinal as usize)
            .cloned()
            // Array index past the end reverts without a reason.
            .ok_or_else(|| LedgerError::Failure(RawFailure::from_message("execution reverted")))
    }

    async fn read_vote_history(&self) -> Result<Vec<VoteRecord>, LedgerError> {
        self.ledger.begin_read(ReadKind::History)?;
        Ok(self.ledger.contract().history.clone())
    }

    async fn read_winner(&self) -> Result<WinnerResult, LedgerError> {
        self.ledger.begin_read(ReadKind::Winner)?;
        let winner = self.ledger.contract().winner();
        winner.map_err(|reason| self.ledger.revert(reason))
    }

    async fn submit(&self, call: LedgerCall) -> Result<PendingTx, LedgerError> {
        let injected = self.ledger.faults().submit_failures.pop_front();
        if let Some(error) = injected {
            return Err(error);
        }
        let now = self.ledger.shared.clock.now();
        let applied = self.ledger.contract().apply(&self.caller, &call, now);
        applied.map_err(|reason| self.ledger.revert(reason))?;
        lock(&self.ledger.shared.submissions).push((self.caller.clone(), call));
        let n = self.ledger.shared.next_tx.fetch_add(1, Ordering::SeqCst);
        Ok(PendingTx {
            tx_hash: format!("0x{n:064x}"),
        })
    }

    async fn wait_for_confirmation(&self, tx: PendingTx) -> Result<Receipt, LedgerError> {
        let mut open = self.ledger.shared.confirmations_open.subscribe();
        // The sender lives in `Shared`, which outlives this borrow.
        let _ = open.wait_for(|open| *open).await;
        let injected = self.ledger.faults().confirmation_failures.pop_front();
        if let Some(error) = injected {
            return Err(error);
        }
        let block = u64::from_str_radix(tx.tx_hash.trim_start_matches("0x"), 16).ok();
        Ok(Receipt {
            tx_hash: tx.tx_hash,
            block_number: block,
        })
    }
}

/// Connector that hands out [`NullLedgerHandle`]s.
pub struct NullConnector {
    ledger: NullLedger,
    fail_next: Mutex<Option<LedgerError>>,
    connections: AtomicUsize,
}

impl NullConnector {
    /// The next `connect` fails with `error`.
    pub fn fail_next(&self, error: LedgerError) {
        *lock(&self.fail_next) = Some(error);
    }

    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerConnector for NullConnector {
    async fn connect(&self, identity: &Identity) -> Result<Arc<dyn ElectionLedger>, LedgerError> {
        if let Some(error) = lock(&self.fail_next).take() {
            return Err(error);
        }
        self.connections.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(self.ledger.handle(identity)))
    }
}
