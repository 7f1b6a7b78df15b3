//! The user-facing result of classification.

use serde::Serialize;
use std::fmt;

use crate::rules::{RejectionCode, WalletCondition};

/// Which tier of the cascade produced a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    /// A known contract rule violation, shown verbatim.
    LedgerRejection(RejectionCode),
    /// A wallet or transport condition, shown as a paraphrase.
    Wallet(WalletCondition),
    /// Short unrecognized text, passed through.
    Unclassified,
    /// Nothing usable; the generic message.
    Fallback,
}

/// A single notification text plus where it came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserMessage {
    pub category: Category,
    pub text: String,
}

impl UserMessage {
    pub fn new(category: Category, text: impl Into<String>) -> Self {
        Self {
            category,
            text: text.into(),
        }
    }

    /// Whether the operator cancelled in the wallet.
    pub fn is_cancellation(&self) -> bool {
        self.category == Category::Wallet(WalletCondition::UserCancelled)
    }

    pub fn rejection_code(&self) -> Option<RejectionCode> {
        match self.category {
            Category::LedgerRejection(code) => Some(code),
            _ => None,
        }
    }
}

impl fmt::Display for UserMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
