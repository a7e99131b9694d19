//! Token custody ledger used by the governance engine.
//!
//! The engine only ever sees the [`TokenLedger`] trait: balances, total supply,
//! transfers, allowance-based pulls and a privileged [`Executable`] entrypoint.
//! [`Token`] is an in-memory ERC-20-style implementation with role-gated minting,
//! used by tests and the CLI.

pub mod call;
pub mod error;
pub mod ledger;
pub mod token;

pub use call::TokenCall;
pub use error::TokenError;
pub use ledger::{Executable, TokenLedger};
pub use token::{Role, Token};
