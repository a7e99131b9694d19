//! In-memory fungible token with role-based access control.

use std::collections::{HashMap, HashSet};

use crate::call::TokenCall;
use crate::error::TokenError;
use crate::ledger::{Executable, TokenLedger};
use dao_types::{Address, TokenAmount};
use serde::{Deserialize, Serialize};

/// Access-control roles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// May grant and revoke roles.
    Admin,
    /// May mint. Governance needs this to execute mint proposals.
    Dao,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN_ROLE",
            Self::Dao => "DAO_ROLE",
        }
    }
}

/// An ERC-20-style token ledger.
///
/// The whole initial supply is minted to `owner`, who also receives
/// [`Role::Admin`].
#[derive(Clone, Debug)]
pub struct Token {
    address: Address,
    name: String,
    symbol: String,
    balances: HashMap<Address, TokenAmount>,
    /// (owner, spender) → remaining allowance.
    allowances: HashMap<(Address, Address), TokenAmount>,
    roles: HashMap<Role, HashSet<Address>>,
    total_supply: TokenAmount,
}

impl Token {
    pub fn new(
        address: Address,
        name: impl Into<String>,
        symbol: impl Into<String>,
        initial_supply: TokenAmount,
        owner: Address,
    ) -> Self {
        let mut balances = HashMap::new();
        if !initial_supply.is_zero() {
            balances.insert(owner, initial_supply);
        }
        let mut roles: HashMap<Role, HashSet<Address>> = HashMap::new();
        roles.entry(Role::Admin).or_default().insert(owner);
        Self {
            address,
            name: name.into(),
            symbol: symbol.into(),
            balances,
            allowances: HashMap::new(),
            roles,
            total_supply: initial_supply,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn approve(&mut self, owner: &Address, spender: &Address, amount: TokenAmount) {
        tracing::debug!(%owner, %spender, amount = amount.raw(), "approve");
        self.allowances.insert((*owner, *spender), amount);
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> TokenAmount {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(TokenAmount::ZERO)
    }

    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.roles
            .get(&role)
            .is_some_and(|members| members.contains(account))
    }

    /// Grant `role` to `account`. `admin` must hold [`Role::Admin`].
    pub fn grant_role(
        &mut self,
        admin: &Address,
        role: Role,
        account: &Address,
    ) -> Result<(), TokenError> {
        self.require_role(Role::Admin, admin)?;
        tracing::info!(role = role.as_str(), %account, "role granted");
        self.roles.entry(role).or_default().insert(*account);
        Ok(())
    }

    /// Revoke `role` from `account`. `admin` must hold [`Role::Admin`].
    pub fn revoke_role(
        &mut self,
        admin: &Address,
        role: Role,
        account: &Address,
    ) -> Result<(), TokenError> {
        self.require_role(Role::Admin, admin)?;
        if let Some(members) = self.roles.get_mut(&role) {
            members.remove(account);
        }
        tracing::info!(role = role.as_str(), %account, "role revoked");
        Ok(())
    }

    /// Create `amount` new tokens for `to`. `caller` must hold [`Role::Dao`].
    pub fn mint(
        &mut self,
        caller: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> Result<(), TokenError> {
        self.require_role(Role::Dao, caller)?;
        if to.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.total_supply = supply;
        self.balances.insert(*to, balance);
        tracing::debug!(%to, amount = amount.raw(), "mint");
        Ok(())
    }

    fn require_role(&self, role: Role, account: &Address) -> Result<(), TokenError> {
        if self.has_role(role, account) {
            Ok(())
        } else {
            Err(TokenError::MissingRole {
                account: *account,
                role: role.as_str(),
            })
        }
    }

    /// Validate then apply a balance move. Nothing changes on error.
    fn move_balance(
        &mut self,
        from: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> Result<(), TokenError> {
        if to.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        let available = self.balance_of(from);
        let debited = available
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientBalance {
                needed: amount.raw(),
                available: available.raw(),
            })?;
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.balances.insert(*from, debited);
        self.balances.insert(*to, credited);
        Ok(())
    }
}

impl TokenLedger for Token {
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
        self.move_balance(from, to, amount)?;
        tracing::debug!(%from, %to, amount = amount.raw(), "transfer");
        Ok(())
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> Result<(), TokenError> {
        let allowance = self.allowance(owner, spender);
        let remaining = allowance
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientAllowance {
                needed: amount.raw(),
                available: allowance.raw(),
            })?;
        self.move_balance(owner, to, amount)?;
        self.allowances.insert((*owner, *spender), remaining);
        tracing::debug!(%spender, %owner, %to, amount = amount.raw(), "transfer_from");
        Ok(())
    }

    fn execute(&mut self, caller: &Address, call: &Executable) -> Result<(), TokenError> {
        if call.recipient != self.address {
            return Err(TokenError::UnknownRecipient(call.recipient));
        }
        match TokenCall::decode(&call.payload)? {
            TokenCall::Mint { to, amount } => self.mint(caller, &to, amount),
            TokenCall::Transfer { to, amount } => self.transfer(caller, &to, amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(label: &str) -> Address {
        Address::derive(label)
    }

    fn token() -> Token {
        Token::new(
            addr("token"),
            "Voting Token",
            "VTT",
            TokenAmount::from_tokens(100),
            addr("owner"),
        )
    }

    #[test]
    fn initial_supply_goes_to_owner() {
        let t = token();
        assert_eq!(t.total_supply(), TokenAmount::from_tokens(100));
        assert_eq!(t.balance_of(&addr("owner")), TokenAmount::from_tokens(100));
        assert!(t.has_role(Role::Admin, &addr("owner")));
        assert!(!t.has_role(Role::Dao, &addr("owner")));
        assert_eq!(t.symbol(), "VTT");
    }

    #[test]
    fn transfer_moves_balance() {
        let mut t = token();
        t.transfer(&addr("owner"), &addr("alice"), TokenAmount::from_tokens(30))
            .unwrap();
        assert_eq!(t.balance_of(&addr("alice")), TokenAmount::from_tokens(30));
        assert_eq!(t.balance_of(&addr("owner")), TokenAmount::from_tokens(70));
    }

    #[test]
    fn transfer_more_than_balance_fails_without_effect() {
        let mut t = token();
        let err = t
            .transfer(&addr("alice"), &addr("bob"), TokenAmount::new(1))
            .unwrap_err();
        assert!(matches!(err, TokenError::InsufficientBalance { .. }));
        assert_eq!(t.balance_of(&addr("bob")), TokenAmount::ZERO);
    }

    #[test]
    fn transfer_from_spends_allowance() {
        let mut t = token();
        let owner = addr("owner");
        let spender = addr("dao");
        t.approve(&owner, &spender, TokenAmount::from_tokens(10));

        t.transfer_from(&spender, &owner, &spender, TokenAmount::from_tokens(4))
            .unwrap();
        assert_eq!(t.allowance(&owner, &spender), TokenAmount::from_tokens(6));
        assert_eq!(t.balance_of(&spender), TokenAmount::from_tokens(4));

        let err = t
            .transfer_from(&spender, &owner, &spender, TokenAmount::from_tokens(7))
            .unwrap_err();
        assert!(matches!(err, TokenError::InsufficientAllowance { .. }));
        assert_eq!(t.allowance(&owner, &spender), TokenAmount::from_tokens(6));
    }

    #[test]
    fn transfer_from_with_allowance_but_no_balance_keeps_allowance() {
        let mut t = token();
        let alice = addr("alice");
        let dao = addr("dao");
        t.approve(&alice, &dao, TokenAmount::from_tokens(10));
        let err = t
            .transfer_from(&dao, &alice, &dao, TokenAmount::from_tokens(1))
            .unwrap_err();
        assert!(matches!(err, TokenError::InsufficientBalance { .. }));
        assert_eq!(t.allowance(&alice, &dao), TokenAmount::from_tokens(10));
    }

    #[test]
    fn mint_requires_dao_role() {
        let mut t = token();
        let dao = addr("dao");
        let err = t
            .mint(&dao, &addr("owner"), TokenAmount::from_tokens(1))
            .unwrap_err();
        assert!(matches!(err, TokenError::MissingRole { role: "DAO_ROLE", .. }));

        t.grant_role(&addr("owner"), Role::Dao, &dao).unwrap();
        t.mint(&dao, &addr("owner"), TokenAmount::from_tokens(1)).unwrap();
        assert_eq!(t.total_supply(), TokenAmount::from_tokens(101));
    }

    #[test]
    fn only_admin_grants_roles() {
        let mut t = token();
        let err = t
            .grant_role(&addr("mallory"), Role::Dao, &addr("mallory"))
            .unwrap_err();
        assert!(matches!(err, TokenError::MissingRole { role: "ADMIN_ROLE", .. }));

        t.grant_role(&addr("owner"), Role::Dao, &addr("dao")).unwrap();
        t.revoke_role(&addr("owner"), Role::Dao, &addr("dao")).unwrap();
        assert!(!t.has_role(Role::Dao, &addr("dao")));
    }

    #[test]
    fn execute_routes_mint_payload() {
        let mut t = token();
        let dao = addr("dao");
        t.grant_role(&addr("owner"), Role::Dao, &dao).unwrap();
        let payload = TokenCall::Mint {
            to: addr("owner"),
            amount: TokenAmount::from_tokens(100),
        }
        .encode();

        t.execute(&dao, &Executable::new(addr("token"), payload))
            .unwrap();
        assert_eq!(t.total_supply(), TokenAmount::from_tokens(200));
    }

    #[test]
    fn execute_rejects_foreign_recipient_and_bad_payload() {
        let mut t = token();
        let dao = addr("dao");
        let err = t
            .execute(&dao, &Executable::new(addr("elsewhere"), vec![]))
            .unwrap_err();
        assert!(matches!(err, TokenError::UnknownRecipient(_)));

        let err = t
            .execute(&dao, &Executable::new(addr("token"), vec![9, 9]))
            .unwrap_err();
        assert!(matches!(err, TokenError::MalformedCall(_)));
    }
}
