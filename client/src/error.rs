use thiserror::Error;

use evote_contract::LedgerError;
use evote_types::TypesError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("config error: {0}")]
    Config(String),

    #[error("no wallet account connected")]
    NotConnected,

    /// The control for this call is disabled in the current state.
    #[error("{0}")]
    Refused(&'static str),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("invalid input: {0}")]
    Input(#[from] TypesError),
}
