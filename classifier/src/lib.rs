//! Failure classification for the ledger boundary.
//!
//! Three tiers, evaluated in order:
//! 1. contract rejections, returned verbatim ([`rules::LEDGER_REJECTIONS`]);
//! 2. wallet/transport conditions, paraphrased ([`rules::WALLET_CONDITIONS`]);
//! 3. short raw text passed through, else a generic message.
//!
//! [`classify`] is total: every input yields a message.

pub mod extract;
pub mod message;
pub mod rules;

use evote_contract::{LedgerError, RawFailure};

pub use extract::extract_reason;
pub use message::{Category, UserMessage};
pub use rules::{LedgerRejection, RejectionCode, RejectionPath, WalletCondition};

/// Shown when nothing more specific is available.
pub const FALLBACK_MESSAGE: &str = "An unexpected error occurred";

/// Raw text at or above this many characters is not shown to operators.
pub const MAX_PASSTHROUGH_CHARS: usize = 200;

/// Classify a raw failure into a single user-facing message.
pub fn classify(raw: &RawFailure) -> UserMessage {
    let reason = extract_reason(raw);
    tracing::debug!(reason = %reason, "classifying ledger failure");

    if let Some(rejection) = rules::match_rejection(&reason) {
        return UserMessage::new(Category::LedgerRejection(rejection.code), rejection.message);
    }

    let condition = rules::match_wallet(&reason)
        .or_else(|| raw.is_user_cancellation().then_some(WalletCondition::UserCancelled));
    if let Some(condition) = condition {
        return UserMessage::new(Category::Wallet(condition), condition.message());
    }

    if !reason.is_empty() && reason.chars().count() < MAX_PASSTHROUGH_CHARS {
        return UserMessage::new(Category::Unclassified, reason);
    }

    UserMessage::new(Category::Fallback, FALLBACK_MESSAGE)
}

/// Classify any ledger-boundary error.
pub fn classify_error(err: &LedgerError) -> UserMessage {
    classify(&err.to_raw())
}
