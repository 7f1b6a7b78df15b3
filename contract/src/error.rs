use thiserror::Error;

use crate::failure::RawFailure;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The ledger or wallet rejected the request.
    #[error("{0}")]
    Failure(RawFailure),

    /// An indexed read past the end of a list.
    #[error("index {0} is out of range")]
    OutOfRange(u32),

    /// The ledger does not expose this operation.
    #[error("operation {0} is not supported by this ledger")]
    Unsupported(&'static str),

    #[error("ledger transport error: {0}")]
    Transport(String),

    #[error("invalid ledger response: {0}")]
    InvalidResponse(String),
}

impl LedgerError {
    /// Whether this ends an indexed probe: an explicit out-of-range signal or
    /// a revert from the ledger itself. Transport problems do not qualify.
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange(_) | Self::Failure(_))
    }

    pub fn is_user_cancellation(&self) -> bool {
        matches!(self, Self::Failure(raw) if raw.is_user_cancellation())
    }

    /// The failure as a raw payload for classification.
    pub fn to_raw(&self) -> RawFailure {
        match self {
            Self::Failure(raw) => raw.clone(),
            other => RawFailure::from_message(other.to_string()),
        }
    }
}

impl From<RawFailure> for LedgerError {
    fn from(raw: RawFailure) -> Self {
        Self::Failure(raw)
    }
}
