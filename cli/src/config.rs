//! Runner configuration with TOML file support.
//!
//! Accounts are referred to by label everywhere. A label is either a `0x`
//! address or any other string, which is turned into an address with
//! [`Address::derive`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CliError;
use dao_governance::params::DEFAULT_DEBATING_PERIOD_SECS;
use dao_types::{Address, TokenAmount};
use dao_utils::LogFormat;

/// Configuration for a governance deployment plus its initial holders.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DaoConfig {
    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Virtual start time in Unix seconds. Defaults to the system clock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<u64>,

    #[serde(default)]
    pub token: TokenConfig,

    #[serde(default)]
    pub governance: GovernanceConfig,

    /// Holders funded from the owner's initial supply at setup.
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenConfig {
    #[serde(default = "default_token_label")]
    pub address: String,

    #[serde(default = "default_token_name")]
    pub name: String,

    #[serde(default = "default_token_symbol")]
    pub symbol: String,

    /// Whole tokens minted to the owner, e.g. `"100"` or `"0.5"`.
    #[serde(default = "default_supply")]
    pub supply: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// Custody account of the engine.
    #[serde(default = "default_dao_label")]
    pub address: String,

    #[serde(default = "default_chair")]
    pub chair: String,

    #[serde(default = "default_owner")]
    pub owner: String,

    #[serde(default = "default_quorum_percentage")]
    pub quorum_percentage: u8,

    #[serde(default = "default_debating_period_secs")]
    pub debating_period_secs: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccountConfig {
    pub name: String,

    /// Whole tokens transferred from the owner.
    pub balance: String,

    /// Allowance granted to the governance address. Defaults to the balance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approve: Option<String>,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}

fn default_token_label() -> String {
    "token".to_string()
}

fn default_token_name() -> String {
    "Voting Token".to_string()
}

fn default_token_symbol() -> String {
    "VTT".to_string()
}

fn default_supply() -> String {
    "100".to_string()
}

fn default_dao_label() -> String {
    "dao".to_string()
}

fn default_chair() -> String {
    "chair".to_string()
}

fn default_owner() -> String {
    "owner".to_string()
}

fn default_quorum_percentage() -> u8 {
    40
}

fn default_debating_period_secs() -> u64 {
    DEFAULT_DEBATING_PERIOD_SECS
}

// ── Impl ───────────────────────────────────────────────────────────────

impl DaoConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, CliError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, CliError> {
        toml::from_str(s).map_err(|e| CliError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, CliError> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config(e.to_string()))
    }
}

impl Default for DaoConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            start_time: None,
            token: TokenConfig::default(),
            governance: GovernanceConfig::default(),
            accounts: Vec::new(),
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            address: default_token_label(),
            name: default_token_name(),
            symbol: default_token_symbol(),
            supply: default_supply(),
        }
    }
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            address: default_dao_label(),
            chair: default_chair(),
            owner: default_owner(),
            quorum_percentage: default_quorum_percentage(),
            debating_period_secs: default_debating_period_secs(),
        }
    }
}

/// Resolve an account label to an address.
pub fn resolve(label: &str) -> Address {
    if label.starts_with("0x") {
        if let Ok(address) = label.parse() {
            return address;
        }
    }
    Address::derive(label)
}

/// Parse a whole-token amount field, naming the field on failure.
pub fn parse_amount(field: &str, value: &str) -> Result<TokenAmount, CliError> {
    TokenAmount::parse_units(value).map_err(|e| CliError::Config(format!("{field}: {e}")))
}
