//! The ledger capability consumed by governance.

use crate::error::TokenError;
use dao_types::{Address, TokenAmount};
use serde::{Deserialize, Serialize};

/// A call target plus an opaque payload, executed through
/// [`TokenLedger::execute`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Executable {
    pub recipient: Address,
    pub payload: Vec<u8>,
}

impl Executable {
    pub fn new(recipient: Address, payload: Vec<u8>) -> Self {
        Self { recipient, payload }
    }
}

/// Fungible balances plus a privileged call entrypoint.
///
/// Every method either applies fully or returns an error without side effects.
pub trait TokenLedger {
    /// Address the ledger itself is reachable at.
    fn address(&self) -> Address;

    fn balance_of(&self, account: &Address) -> TokenAmount;

    fn total_supply(&self) -> TokenAmount;

    /// Move `amount` from `from` (the calling account) to `to`.
    fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> Result<(), TokenError>;

    /// Move `amount` from `owner` to `to`, spending `spender`'s allowance.
    fn transfer_from(
        &mut self,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> Result<(), TokenError>;

    /// Run an arbitrary call on behalf of `caller`. Authorization is decided by
    /// the ledger, not by the caller.
    fn execute(&mut self, caller: &Address, call: &Executable) -> Result<(), TokenError>;
}
