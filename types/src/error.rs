//! Errors raised while parsing or constructing primitive types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid address {0:?}: expected 0x followed by 40 hex characters")]
    InvalidAddress(String),

    #[error("invalid token amount: {0}")]
    InvalidAmount(String),
}
