//! Token-ledger errors.

use dao_types::Address;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("insufficient allowance: need {needed}, have {available}")]
    InsufficientAllowance { needed: u128, available: u128 },

    #[error("account {account} is missing role {role}")]
    MissingRole { account: Address, role: &'static str },

    #[error("no callable contract at {0}")]
    UnknownRecipient(Address),

    #[error("malformed call payload: {0}")]
    MalformedCall(String),

    #[error("transfer to the zero address")]
    ZeroAddress,

    #[error("arithmetic overflow")]
    Overflow,
}
