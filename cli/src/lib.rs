//! Scenario runner behind the `dao` binary.
//!
//! A [`DaoConfig`] describes a deployment: the voting token, the governance
//! parameters and the accounts funded at start. A [`Script`] is a list of
//! governance actions that a [`Runner`] replays against that deployment in
//! virtual time.

pub mod config;
pub mod error;
pub mod runner;
pub mod script;

pub use config::DaoConfig;
pub use error::{CliError, StepError};
pub use runner::{RunReport, Runner};
pub use script::{Script, Step};
