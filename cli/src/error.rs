//! Error types for the scenario runner.

use dao_governance::GovernanceError;
use dao_token::TokenError;
use dao_types::TypeError;

/// Failures that stop the runner before or outside a script step.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(String),

    #[error("script error: {0}")]
    Script(String),

    #[error("setup failed: {0}")]
    Setup(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a single script step was rejected. Reported, never fatal.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error(transparent)]
    Governance(#[from] GovernanceError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("invalid payload: {0}")]
    Payload(String),

    #[error("unknown role: {0}")]
    UnknownRole(String),
}
