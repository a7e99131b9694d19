//! Fundamental types for the stake-weighted DAO.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account addresses, token amounts, timestamps and the clock capability, and
//! proposal identifiers.

pub mod address;
pub mod amount;
pub mod error;
pub mod id;
pub mod time;

pub use address::Address;
pub use amount::{TokenAmount, TOKEN_UNIT};
pub use error::TypeError;
pub use id::ProposalId;
pub use time::{Clock, SystemClock, Timestamp};
