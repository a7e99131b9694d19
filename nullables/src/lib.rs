//! Nullable infrastructure for deterministic testing.
//!
//! External dependencies of the governance engine (the clock and the token
//! ledger) are abstracted behind traits. This crate provides test-friendly
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch wall-clock time or a real ledger
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod ledger;

pub use clock::NullClock;
pub use ledger::NullLedger;
