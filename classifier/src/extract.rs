//! Best-effort reason extraction from a [`RawFailure`].

use evote_contract::RawFailure;

/// `reason="..."` as printed by provider error formatting.
const QUOTED_REASON: (&str, char) = ("reason=\"", '"');
/// Hardhat-style revert text.
const REVERT_STRING: (&str, char) = ("reverted with reason string '", '\'');
/// Node-style revert text; the reason runs to the next quote or the end.
const EXECUTION_REVERTED: &str = "execution reverted: ";

/// Pull the single most specific reason string out of a failure.
///
/// Preference: structured `reason`, then nested provider messages, then the
/// generic `message` (searched for known revert envelopes, else whole), then
/// `shortMessage`. Returns an empty string when nothing carries text.
pub fn extract_reason(raw: &RawFailure) -> String {
    if let Some(reason) = raw.reason.as_deref().filter(|r| !r.is_empty()) {
        return reason.to_string();
    }
    if let Some(nested) = raw.nested_message() {
        return nested.to_string();
    }
    if let Some(message) = raw.message.as_deref().filter(|m| !m.is_empty()) {
        return reason_from_message(message).to_string();
    }
    raw.short_message.clone().unwrap_or_default()
}

/// The reason embedded in a generic message, or the whole message.
pub fn reason_from_message(message: &str) -> &str {
    delimited(message, QUOTED_REASON.0, QUOTED_REASON.1)
        .or_else(|| delimited(message, REVERT_STRING.0, REVERT_STRING.1))
        .or_else(|| execution_reverted(message))
        .unwrap_or(message)
}

/// Text between `prefix` and the next `terminator`. Both must be present and
/// the captured text non-empty.
fn delimited<'a>(text: &'a str, prefix: &str, terminator: char) -> Option<&'a str> {
    let start = text.find(prefix)? + prefix.len();
    let rest = &text[start..];
    let end = rest.find(terminator)?;
    let captured = &rest[..end];
    (!captured.is_empty()).then_some(captured)
}

fn execution_reverted(text: &str) -> Option<&str> {
    let start = text.find(EXECUTION_REVERTED)? + EXECUTION_REVERTED.len();
    let rest = &text[start..];
    let captured = match rest.find('"') {
        Some(end) => &rest[..end],
        None => rest,
    };
    (!captured.is_empty()).then_some(captured)
}

#[cfg(test)]
mod tests {
    use super::*;
    use evote_contract::{ProviderError, ProviderInfo};

    #[test]
    fn structured_reason_wins() {
        let raw = RawFailure {
            reason: Some("Candidate not found".into()),
            message: Some("execution reverted: something else".into()),
            ..Default::default()
        };
        assert_eq!(extract_reason(&raw), "Candidate not found");
    }

    #[test]
    fn nested_beats_generic_message() {
        let raw = RawFailure {
            info: Some(ProviderInfo {
                error: Some(ProviderError {
                    code: None,
                    message: Some("nested text".into()),
                }),
            }),
            message: Some("outer text".into()),
            ..Default::default()
        };
        assert_eq!(extract_reason(&raw), "nested text");
    }

    #[test]
    fn quoted_reason_envelope() {
        let msg = r#"execution reverted (action="estimateGas", reason="Voter already registered", code=CALL_EXCEPTION)"#;
        assert_eq!(reason_from_message(msg), "Voter already registered");
    }

    #[test]
    fn revert_string_envelope() {
        let msg = "Error: VM Exception while processing transaction: reverted with reason string 'Voting has started'";
        assert_eq!(reason_from_message(msg), "Voting has started");
    }

    #[test]
    fn execution_reverted_envelope() {
        assert_eq!(
            reason_from_message("execution reverted: Voting has ended"),
            "Voting has ended"
        );
        assert_eq!(
            reason_from_message(r#"{"message":"execution reverted: No voting is on going","code":3}"#),
            "No voting is on going"
        );
    }

    #[test]
    fn unmatched_message_is_returned_whole() {
        assert_eq!(reason_from_message("gateway timeout"), "gateway timeout");
        assert_eq!(reason_from_message(r#"reason="""#), r#"reason="""#);
    }

    #[test]
    fn short_message_is_last_resort() {
        let raw = RawFailure::default().with_short_message("could not coalesce error");
        assert_eq!(extract_reason(&raw), "could not coalesce error");
        assert_eq!(extract_reason(&RawFailure::default()), "");
    }
}
