//! Call payloads understood by [`Token::execute`](crate::Token).

use crate::error::TokenError;
use dao_types::{Address, TokenAmount};
use serde::{Deserialize, Serialize};

/// A state-changing token call, encoded with bincode into a proposal's payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenCall {
    /// Create new supply. Requires [`Role::Dao`](crate::Role::Dao).
    Mint { to: Address, amount: TokenAmount },
    /// Move tokens out of the caller's balance.
    Transfer { to: Address, amount: TokenAmount },
}

impl TokenCall {
    pub fn encode(&self) -> Vec<u8> {
        // Enum of fixed-size fields; serialization cannot fail.
        bincode::serialize(self).unwrap_or_default()
    }

    pub fn decode(payload: &[u8]) -> Result<Self, TokenError> {
        bincode::deserialize(payload).map_err(|e| TokenError::MalformedCall(e.to_string()))
    }
}
