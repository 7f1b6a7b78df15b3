use proptest::prelude::*;

use evote_classifier::rules::LEDGER_REJECTIONS;
use evote_classifier::{classify, Category, MAX_PASSTHROUGH_CHARS};
use evote_contract::RawFailure;

fn arb_rejection_index() -> impl Strategy<Value = usize> {
    0..LEDGER_REJECTIONS.len()
}

fn scramble_case(text: &str, mask: &[bool]) -> String {
    text.chars()
        .zip(mask.iter().cycle())
        .map(|(c, upper)| if *upper { c.to_ascii_uppercase() } else { c.to_ascii_lowercase() })
        .collect()
}

proptest! {
    /// Classification never panics and never yields empty or overlong text.
    #[test]
    fn classify_is_total(message in ".{0,400}", reason in proptest::option::of(".{0,50}")) {
        let raw = RawFailure { reason, message: Some(message), ..Default::default() };
        let msg = classify(&raw);
        prop_assert!(!msg.text.is_empty());
        prop_assert!(msg.text.chars().count() < MAX_PASSTHROUGH_CHARS);
    }

    /// Same input, same output.
    #[test]
    fn classify_is_deterministic(message in ".{0,120}") {
        let raw = RawFailure::from_message(message);
        prop_assert_eq!(classify(&raw), classify(&raw));
    }

    /// A contract message embedded in the execution-reverted envelope comes
    /// back in its canonical form whatever its casing.
    #[test]
    fn embedded_rejection_is_returned_verbatim(
        idx in arb_rejection_index(),
        mask in prop::collection::vec(any::<bool>(), 1..8),
        prefix in "[0-9 ]{0,12}",
    ) {
        let rejection = &LEDGER_REJECTIONS[idx];
        let text = format!("{prefix}execution reverted: {}", scramble_case(rejection.message, &mask));
        let msg = classify(&RawFailure::from_message(text));
        prop_assert_eq!(msg.text.as_str(), rejection.message);
        prop_assert_eq!(msg.category, Category::LedgerRejection(rejection.code));
    }
}
