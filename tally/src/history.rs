//! Ordered, display-ready view of the vote log.

use serde::Serialize;

use evote_types::{SessionPhase, VoteRecord};

/// Newest first. Records with equal timestamps keep their source order.
///
/// The input is left untouched; a new vector is returned.
pub fn order_history(records: &[VoteRecord]) -> Vec<VoteRecord> {
    let mut ordered = records.to_vec();
    // `sort_by` is stable.
    ordered.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    ordered
}

/// Why the history is withheld.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum HiddenReason {
    NotStarted,
    InProgress,
}

impl HiddenReason {
    pub fn message(&self) -> &'static str {
        match self {
            Self::NotStarted => "Voting has not started",
            Self::InProgress => "Voting is in progress",
        }
    }
}

/// One numbered line of the history panel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// 1-based position in display order.
    pub position: usize,
    pub record: VoteRecord,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum HistoryView {
    Hidden { reason: HiddenReason },
    Visible { total: usize, entries: Vec<HistoryEntry> },
}

impl HistoryView {
    /// Apply the effective-visibility rule and order the records.
    pub fn build(records: &[VoteRecord], phase: SessionPhase, hide_votes: bool) -> Self {
        if phase.visibility(hide_votes).is_hidden() {
            let reason = if phase.started {
                HiddenReason::InProgress
            } else {
                HiddenReason::NotStarted
            };
            return Self::Hidden { reason };
        }
        let entries = order_history(records)
            .into_iter()
            .enumerate()
            .map(|(i, record)| HistoryEntry {
                position: i + 1,
                record,
            })
            .collect();
        Self::Visible {
            total: records.len(),
            entries,
        }
    }
}
