//! Errors raised while constructing or transitioning election types.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypesError {
    #[error("Please enter the valid address")]
    EmptyIdentity,

    #[error("ownership has already been claimed by {0}")]
    AlreadyOwned(String),

    #[error("the zero address cannot claim ownership")]
    ZeroClaimant,
}
