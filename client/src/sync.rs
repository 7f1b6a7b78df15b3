//! Chain state synchronization.
//!
//! A [`Snapshot`] is the client's read-only copy of election state. It is
//! rebuilt from four independent reads (phase, hide flag, candidates,
//! history) plus the winner once the session has ended. A read that fails
//! keeps the previous known-good value and is reported as degraded.

use serde::Serialize;
use tracing::{debug, warn};

use evote_contract::{ElectionLedger, LedgerError};
use evote_tally::{winner_for, HistoryView, VoteDistribution, WinnerStatus};
use evote_types::{Candidate, SessionPhase, Visibility, VoteRecord, WinnerResult};

/// Election state as last read from the ledger.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub phase: SessionPhase,
    pub hide_votes: bool,
    pub candidates: Vec<Candidate>,
    pub history: Vec<VoteRecord>,
    pub winner: Option<WinnerResult>,
}

impl Snapshot {
    /// Effective visibility: the hide flag stops applying once closed.
    pub fn visibility(&self) -> Visibility {
        self.phase.visibility(self.hide_votes)
    }

    pub fn votes_hidden(&self) -> bool {
        self.visibility().is_hidden()
    }

    pub fn winner_status(&self) -> WinnerStatus {
        WinnerStatus::from_snapshot(self.phase, self.winner.as_ref())
    }

    pub fn history_view(&self) -> HistoryView {
        HistoryView::build(&self.history, self.phase, self.hide_votes)
    }

    pub fn distribution(&self) -> Option<VoteDistribution> {
        VoteDistribution::visible(&self.candidates, self.phase, self.hide_votes)
    }

    /// The ledger's winner disagrees with a tally of the read candidates.
    ///
    /// False while either side is missing.
    pub fn winner_mismatch(&self) -> bool {
        match (&self.winner, winner_for(self.phase, &self.candidates)) {
            (Some(reported), Some(tallied)) => *reported != tallied,
            _ => false,
        }
    }
}

/// A read that failed during a refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ReadTarget {
    Phase,
    HideVotes,
    Candidates,
    History,
    Winner,
}

/// Outcome of a refresh: the merged snapshot and which reads fell back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub snapshot: Snapshot,
    pub degraded: Vec<ReadTarget>,
}

impl SyncReport {
    pub fn is_complete(&self) -> bool {
        self.degraded.is_empty()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Synchronizer {
    max_probe: u32,
}

impl Synchronizer {
    pub fn new(max_probe: u32) -> Self {
        Self { max_probe }
    }

    /// Read everything from scratch.
    pub async fn sync(&self, ledger: &dyn ElectionLedger) -> Snapshot {
        self.refresh(ledger, &Snapshot::default()).await.snapshot
    }

    /// Re-read everything, keeping `prior` values where a read fails.
    pub async fn refresh(&self, ledger: &dyn ElectionLedger, prior: &Snapshot) -> SyncReport {
        let (phase, hide_votes, candidates, history) = tokio::join!(
            ledger.read_phase(),
            ledger.read_hide_votes(),
            self.read_candidates(ledger),
            ledger.read_vote_history(),
        );

        let mut degraded = Vec::new();
        let phase = keep_prior(phase, prior.phase, ReadTarget::Phase, &mut degraded);
        let phase = normalize_phase(phase);
        let hide_votes = keep_prior(hide_votes, prior.hide_votes, ReadTarget::HideVotes, &mut degraded);
        let candidates = keep_prior(
            candidates,
            prior.candidates.clone(),
            ReadTarget::Candidates,
            &mut degraded,
        );
        let history = keep_prior(history, prior.history.clone(), ReadTarget::History, &mut degraded);

        let winner = if phase.ended {
            match ledger.read_winner().await {
                Ok(winner) => Some(winner),
                Err(e) => {
                    warn!(error = %e, "winner read failed");
                    degraded.push(ReadTarget::Winner);
                    None
                }
            }
        } else {
            None
        };

        SyncReport {
            snapshot: Snapshot {
                phase,
                hide_votes,
                candidates,
                history,
                winner,
            },
            degraded,
        }
    }

    /// Bulk read, falling back to an indexed probe from ordinal 0.
    async fn read_candidates(&self, ledger: &dyn ElectionLedger) -> Result<Vec<Candidate>, LedgerError> {
        match ledger.read_all_candidates().await {
            Ok(candidates) => return Ok(candidates),
            Err(e) => debug!(error = %e, "bulk candidate read unavailable, probing"),
        }

        let mut candidates = Vec::new();
        for ordinal in 0..self.max_probe {
            match ledger.read_candidate_at(ordinal).await {
                Ok(candidate) => candidates.push(candidate),
                Err(e) if e.is_out_of_range() => {
                    debug!(count = ordinal, "candidate probe reached the end");
                    return Ok(candidates);
                }
                Err(e) => return Err(e),
            }
        }
        warn!(limit = self.max_probe, "candidate probe hit its limit");
        Ok(candidates)
    }
}

impl Default for Synchronizer {
    fn default() -> Self {
        Self::new(1024)
    }
}

fn keep_prior<T>(read: Result<T, LedgerError>, prior: T, target: ReadTarget, degraded: &mut Vec<ReadTarget>) -> T {
    match read {
        Ok(value) => value,
        Err(e) => {
            warn!(?target, error = %e, "read failed, keeping last known value");
            degraded.push(target);
            prior
        }
    }
}

/// `(false, true)` cannot arise under the ledger's rules; treat it as closed.
fn normalize_phase(phase: SessionPhase) -> SessionPhase {
    if phase.is_anomalous() {
        warn!(started = phase.started, ended = phase.ended, "anomalous session phase, treating as closed");
    }
    phase.normalized()
}

#[cfg(test)]
mod tests {
    use super::*;
    use evote_contract::LedgerCall;
    use evote_nullables::{NullLedger, ReadKind};
    use evote_types::Identity;

    fn id(s: &str) -> Identity {
        Identity::new(s).unwrap()
    }

    fn election(candidates: usize) -> (NullLedger, Identity) {
        let ledger = NullLedger::new();
        let admin = id("0xad");
        ledger.apply(&admin, LedgerCall::ClaimOwnership).unwrap();
        for i in 0..candidates {
            ledger
                .apply(&admin, LedgerCall::AddCandidate(id(&format!("0xc{i}"))))
                .unwrap();
        }
        (ledger, admin)
    }

    #[test]
    fn winner_mismatch_compares_against_tally() {
        let candidates = vec![
            Candidate::new(0, id("0xc0"), 1),
            Candidate::new(1, id("0xc1"), 3),
        ];
        let mut snapshot = Snapshot {
            phase: SessionPhase::CLOSED,
            candidates,
            winner: Some(WinnerResult {
                candidates: vec![id("0xc1")],
                vote_count: 3,
            }),
            ..Snapshot::default()
        };
        assert!(!snapshot.winner_mismatch());

        snapshot.winner = Some(WinnerResult {
            candidates: vec![id("0xc0")],
            vote_count: 1,
        });
        assert!(snapshot.winner_mismatch());

        snapshot.phase = SessionPhase::ACTIVE;
        assert!(!snapshot.winner_mismatch());
    }

    #[tokio::test]
    async fn probe_stops_at_first_out_of_range() {
        let (ledger, admin) = election(3);
        ledger.set_bulk_reads(false);
        let snapshot = Synchronizer::default().sync(&ledger.handle(&admin)).await;
        let ordinals: Vec<u32> = snapshot.candidates.iter().map(|c| c.ordinal).collect();
        assert_eq!(ordinals, vec![0, 1, 2]);
        assert_eq!(ledger.read_count(ReadKind::CandidateAt), 4);
    }

    #[tokio::test]
    async fn probe_respects_limit() {
        let (ledger, admin) = election(5);
        ledger.set_bulk_reads(false);
        let snapshot = Synchronizer::new(2).sync(&ledger.handle(&admin)).await;
        assert_eq!(snapshot.candidates.len(), 2);
        assert_eq!(ledger.read_count(ReadKind::CandidateAt), 2);
    }

    #[tokio::test]
    async fn failed_read_keeps_prior_value() {
        let (ledger, admin) = election(2);
        let handle = ledger.handle(&admin);
        let sync = Synchronizer::default();
        let prior = sync.sync(&handle).await;

        ledger.apply(&admin, LedgerCall::ToggleHideVotes).unwrap();
        ledger.apply(&admin, LedgerCall::AddCandidate(id("0xc9"))).unwrap();
        ledger.fail_reads(ReadKind::HideVotes);

        let report = sync.refresh(&handle, &prior).await;
        assert_eq!(report.degraded, vec![ReadTarget::HideVotes]);
        assert!(!report.snapshot.hide_votes);
        assert_eq!(report.snapshot.candidates.len(), 3);
    }

    #[tokio::test]
    async fn transport_failure_during_probe_keeps_prior_candidates() {
        let (ledger, admin) = election(2);
        let handle = ledger.handle(&admin);
        let sync = Synchronizer::default();
        let prior = sync.sync(&handle).await;

        ledger.set_bulk_reads(false);
        ledger.fail_reads(ReadKind::CandidateAt);
        let report = sync.refresh(&handle, &prior).await;
        assert_eq!(report.degraded, vec![ReadTarget::Candidates]);
        assert_eq!(report.snapshot.candidates, prior.candidates);
    }

    #[tokio::test]
    async fn anomalous_phase_is_closed() {
        let (ledger, admin) = election(2);
        ledger.override_phase(Some(SessionPhase::new(false, true)));
        let snapshot = Synchronizer::default().sync(&ledger.handle(&admin)).await;
        assert_eq!(snapshot.phase, SessionPhase::CLOSED);
    }

    #[tokio::test]
    async fn winner_only_read_when_ended() {
        let (ledger, admin) = election(2);
        let handle = ledger.handle(&admin);
        let sync = Synchronizer::default();
        ledger.apply(&admin, LedgerCall::StartSession).unwrap();
        assert!(sync.sync(&handle).await.winner.is_none());
        assert_eq!(ledger.read_count(ReadKind::Winner), 0);

        ledger.apply(&admin, LedgerCall::EndSession).unwrap();
        let snapshot = sync.sync(&handle).await;
        assert_eq!(snapshot.winner.map(|w| w.candidates.len()), Some(2));
    }

    #[tokio::test]
    async fn winner_failure_yields_none() {
        let (ledger, admin) = election(2);
        ledger.apply(&admin, LedgerCall::StartSession).unwrap();
        ledger.apply(&admin, LedgerCall::EndSession).unwrap();
        ledger.fail_reads(ReadKind::Winner);
        let report = Synchronizer::default()
            .refresh(&ledger.handle(&admin), &Snapshot::default())
            .await;
        assert!(report.snapshot.winner.is_none());
        assert_eq!(report.degraded, vec![ReadTarget::Winner]);
        assert_eq!(report.snapshot.winner_status(), WinnerStatus::AwaitingResult);
    }

    #[tokio::test]
    async fn repeated_syncs_are_equal() {
        let (ledger, admin) = election(3);
        let handle = ledger.handle(&admin);
        let sync = Synchronizer::default();
        assert_eq!(sync.sync(&handle).await, sync.sync(&handle).await);
    }
}
