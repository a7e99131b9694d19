//! Scenario scripts: an ordered list of governance actions in TOML.
//!
//! ```toml
//! [[steps]]
//! action = "deposit"
//! account = "voter1"
//! amount = "25"
//!
//! [[steps]]
//! action = "add-proposal"
//! caller = "chair"
//! recipient = "token"
//! description = "mint 100 to owner"
//! mint = { to = "owner", amount = "100" }
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CliError;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, CliError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| CliError::Script(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, CliError> {
        toml::from_str(s).map_err(|e| CliError::Script(e.to_string()))
    }
}

/// A single scripted action. Amounts are whole-token decimal strings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Step {
    Deposit {
        account: String,
        amount: String,
    },
    /// Set the allowance `account` grants to the governance address.
    Approve {
        account: String,
        amount: String,
    },
    /// Exactly one of `mint` and `payload` gives the call data.
    AddProposal {
        caller: String,
        recipient: String,
        description: String,
        #[serde(default)]
        mint: Option<MintSpec>,
        /// Hex call data, with or without a `0x` prefix.
        #[serde(default)]
        payload: Option<String>,
    },
    Vote {
        account: String,
        proposal: u64,
        support: bool,
    },
    Finish {
        caller: String,
        proposal: u64,
    },
    Withdraw {
        account: String,
    },
    UpdateDebatePeriod {
        caller: String,
        secs: u64,
    },
    /// Grant a token role; `role` is `"admin"` or `"dao"`.
    GrantRole {
        caller: String,
        account: String,
        role: String,
    },
    /// Move virtual time forward.
    Advance {
        secs: u64,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MintSpec {
    pub to: String,
    pub amount: String,
}

impl Step {
    /// The `action` tag as written in scripts.
    pub fn action(&self) -> &'static str {
        match self {
            Self::Deposit { .. } => "deposit",
            Self::Approve { .. } => "approve",
            Self::AddProposal { .. } => "add-proposal",
            Self::Vote { .. } => "vote",
            Self::Finish { .. } => "finish",
            Self::Withdraw { .. } => "withdraw",
            Self::UpdateDebatePeriod { .. } => "update-debate-period",
            Self::GrantRole { .. } => "grant-role",
            Self::Advance { .. } => "advance",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deposit { account, amount } => write!(f, "deposit {account} {amount}"),
            Self::Approve { account, amount } => write!(f, "approve {account} {amount}"),
            Self::AddProposal {
                caller,
                description,
                ..
            } => write!(f, "add-proposal by {caller}: {description}"),
            Self::Vote {
                account,
                proposal,
                support,
            } => {
                let side = if *support { "for" } else { "against" };
                write!(f, "vote {account} {side} #{proposal}")
            }
            Self::Finish { caller, proposal } => write!(f, "finish #{proposal} by {caller}"),
            Self::Withdraw { account } => write!(f, "withdraw {account}"),
            Self::UpdateDebatePeriod { caller, secs } => {
                write!(f, "update-debate-period {secs}s by {caller}")
            }
            Self::GrantRole {
                caller,
                account,
                role,
            } => write!(f, "grant-role {role} to {account} by {caller}"),
            Self::Advance { secs } => write!(f, "advance {secs}s"),
        }
    }
}
