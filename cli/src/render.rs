//! Plain-text views of the session state.

use evote_client::{AccessSummary, Session, Snapshot};
use evote_tally::{HistoryView, WinnerStatus};
use evote_types::{PhaseKind, Timestamp};
use evote_utils::format_elapsed;

fn phase_label(snapshot: &Snapshot) -> &'static str {
    match snapshot.phase.kind() {
        PhaseKind::Pending => "not started",
        PhaseKind::Active => "in progress",
        PhaseKind::Closed => "ended",
    }
}

pub fn status(session: &Session) {
    let snapshot = session.snapshot();
    if let Some(identity) = session.identity() {
        println!("account:     {} ({})", identity.short(), identity);
    }
    let access = match session.access() {
        Some(AccessSummary::Unclaimed) => "no administrator yet",
        Some(AccessSummary::Owner) => "administrator",
        Some(AccessSummary::NotOwner) => "not the administrator",
        None => "unknown",
    };
    println!("access:      {access}");
    println!("voting:      {}", phase_label(snapshot));
    println!(
        "votes:       {}",
        if snapshot.votes_hidden() { "hidden" } else { "visible" }
    );
    println!("candidates:  {}", snapshot.candidates.len());
    for candidate in &snapshot.candidates {
        if snapshot.votes_hidden() {
            println!("  #{:<3} {}", candidate.ordinal, candidate.address);
        } else {
            println!(
                "  #{:<3} {}  {} vote(s)",
                candidate.ordinal, candidate.address, candidate.vote_count
            );
        }
    }
}

pub fn history(snapshot: &Snapshot) {
    match snapshot.history_view() {
        HistoryView::Hidden { reason } => println!("{}", reason.message()),
        HistoryView::Visible { total, entries } => {
            println!("{total} vote(s) cast");
            let now = Timestamp::now();
            for entry in entries {
                println!(
                    "{:>4}. {} voted for {}  ({})",
                    entry.position,
                    entry.record.voter.short(),
                    entry.record.candidate.short(),
                    format_elapsed(entry.record.timestamp, now),
                );
            }
        }
    }
}

pub fn results(snapshot: &Snapshot) {
    match snapshot.distribution() {
        Some(distribution) => {
            println!("{} vote(s) in total", distribution.total);
            for share in &distribution.shares {
                println!(
                    "  #{:<3} {}  {:>4}  {:5.1}%",
                    share.ordinal,
                    share.address.short(),
                    share.votes,
                    share.percent
                );
            }
        }
        None => println!("Votes are hidden until voting ends"),
    }

    if snapshot.winner_mismatch() {
        tracing::warn!(reported = ?snapshot.winner, "reported winner differs from the candidate tally");
    }
    match snapshot.winner_status() {
        WinnerStatus::Decided(winner) if winner.is_tie() => {
            println!("Tie at {} vote(s) between:", winner.vote_count);
            for address in &winner.candidates {
                println!("  {address}");
            }
        }
        WinnerStatus::Decided(winner) => {
            for address in &winner.candidates {
                println!("Winner: {address} with {} vote(s)", winner.vote_count);
            }
        }
        other => {
            if let Some(message) = other.pending_message() {
                println!("{message}");
            }
        }
    }
}
