//! Nullable token ledger — scriptable balances and failures.

use dao_token::{Executable, TokenError, TokenLedger};
use dao_types::{Address, TokenAmount};
use std::collections::HashMap;

/// A permissive in-memory ledger for testing failure paths.
///
/// Transfers ignore allowances. Any operation can be told to fail, and every
/// executed call is recorded instead of interpreted.
#[derive(Debug, Default)]
pub struct NullLedger {
    address: Address,
    balances: HashMap<Address, TokenAmount>,
    total_supply: TokenAmount,
    fail_transfers: bool,
    fail_execution: bool,
    executed: Vec<(Address, Executable)>,
}

impl NullLedger {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            ..Default::default()
        }
    }

    /// Credit `account` out of thin air, growing total supply.
    pub fn fund(&mut self, account: Address, amount: TokenAmount) {
        let balance = self.balance_of(&account);
        self.balances.insert(account, balance + amount);
        self.total_supply = self.total_supply + amount;
    }

    /// Override the reported total supply.
    pub fn set_total_supply(&mut self, supply: TokenAmount) {
        self.total_supply = supply;
    }

    pub fn fail_transfers(&mut self, fail: bool) {
        self.fail_transfers = fail;
    }

    pub fn fail_execution(&mut self, fail: bool) {
        self.fail_execution = fail;
    }

    /// Every call that reached [`TokenLedger::execute`] successfully.
    pub fn executed(&self) -> &[(Address, Executable)] {
        &self.executed
    }
}

impl TokenLedger for NullLedger {
    fn address(&self) -> Address {
        self.address
    }

    fn balance_of(&self, account: &Address) -> TokenAmount {
        self.balances
            .get(account)
            .copied()
            .unwrap_or(TokenAmount::ZERO)
    }

    fn total_supply(&self) -> TokenAmount {
        self.total_supply
    }

    fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> Result<(), TokenError> {
        if self.fail_transfers {
            return Err(TokenError::InsufficientBalance {
                needed: amount.raw(),
                available: 0,
            });
        }
        let available = self.balance_of(from);
        let debited = available
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientBalance {
                needed: amount.raw(),
                available: available.raw(),
            })?;
        self.balances.insert(*from, debited);
        let credited = self.balance_of(to) + amount;
        self.balances.insert(*to, credited);
        Ok(())
    }

    fn transfer_from(
        &mut self,
        _spender: &Address,
        owner: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> Result<(), TokenError> {
        self.transfer(owner, to, amount)
    }

    fn execute(&mut self, caller: &Address, call: &Executable) -> Result<(), TokenError> {
        if self.fail_execution {
            return Err(TokenError::MalformedCall("execution disabled".into()));
        }
        self.executed.push((*caller, call.clone()));
        Ok(())
    }
}
