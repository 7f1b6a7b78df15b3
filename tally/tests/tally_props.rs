use proptest::prelude::*;

use evote_tally::{compute_winner, order_history, VoteDistribution};
use evote_types::{Candidate, Identity, Timestamp, VoteRecord};

fn arb_candidates() -> impl Strategy<Value = Vec<Candidate>> {
    prop::collection::vec(0u64..20, 1..12).prop_map(|votes| {
        votes
            .into_iter()
            .enumerate()
            .map(|(i, v)| Candidate::new(i as u32, Identity::new(format!("0x{i:040x}")).unwrap(), v))
            .collect()
    })
}

fn arb_records() -> impl Strategy<Value = Vec<VoteRecord>> {
    prop::collection::vec(0u64..10, 0..30).prop_map(|stamps| {
        stamps
            .into_iter()
            .enumerate()
            .map(|(i, ts)| VoteRecord {
                voter: Identity::new(format!("0xv{i}")).unwrap(),
                candidate: Identity::new("0xc").unwrap(),
                timestamp: Timestamp::new(ts),
            })
            .collect()
    })
}

proptest! {
    /// Winners all carry the maximum count, and nobody at the maximum is left out.
    #[test]
    fn winner_set_is_exactly_the_maximum(candidates in arb_candidates()) {
        let winner = compute_winner(&candidates).unwrap();
        let max = candidates.iter().map(|c| c.vote_count).max().unwrap();
        prop_assert_eq!(winner.vote_count, max);
        let expected: Vec<Identity> = candidates
            .iter()
            .filter(|c| c.vote_count == max)
            .map(|c| c.address.clone())
            .collect();
        prop_assert_eq!(winner.candidates, expected);
    }

    /// Ordered history is a descending, stable permutation of the input.
    #[test]
    fn history_is_stable_descending(records in arb_records()) {
        let ordered = order_history(&records);
        prop_assert_eq!(ordered.len(), records.len());
        for pair in ordered.windows(2) {
            prop_assert!(pair[0].timestamp >= pair[1].timestamp);
            if pair[0].timestamp == pair[1].timestamp {
                let a = records.iter().position(|r| r == &pair[0]).unwrap();
                let b = records.iter().position(|r| r == &pair[1]).unwrap();
                prop_assert!(a < b);
            }
        }
    }

    /// Percentages cover all votes cast.
    #[test]
    fn distribution_sums_to_total(candidates in arb_candidates()) {
        let dist = VoteDistribution::from_candidates(&candidates);
        let votes: u64 = dist.shares.iter().map(|s| s.votes).sum();
        prop_assert_eq!(votes, dist.total);
        if dist.total > 0 {
            let pct: f64 = dist.shares.iter().map(|s| s.percent).sum();
            prop_assert!((pct - 100.0).abs() < 1e-6);
        }
    }
}
