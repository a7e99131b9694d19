//! Token amount type.
//!
//! Amounts are represented as fixed-point integers (u128) to avoid floating-point errors.
//! The smallest unit is 1 raw; one whole token is [`TOKEN_UNIT`] raw (18 decimals).

use crate::error::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Raw units per whole token.
pub const TOKEN_UNIT: u128 = 1_000_000_000_000_000_000;

const DECIMALS: usize = 18;

/// An amount of the voting token.
///
/// Internally stored as raw units (u128) for precision.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TokenAmount(u128);

impl TokenAmount {
    pub const ZERO: Self = Self(0);

    pub fn new(raw: u128) -> Self {
        Self(raw)
    }

    /// Whole tokens to raw units. Saturates at `u128::MAX`.
    pub fn from_tokens(units: u128) -> Self {
        Self(units.saturating_mul(TOKEN_UNIT))
    }

    /// Parse a decimal token string such as `"25"` or `"2.5"` into raw units.
    pub fn parse_units(s: &str) -> Result<Self, TypeError> {
        let invalid = || TypeError::InvalidAmount(s.to_string());
        let (whole, frac) = match s.trim().split_once('.') {
            Some((w, f)) => (w, f),
            None => (s.trim(), ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if frac.len() > DECIMALS || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let frac_raw: u128 = if frac.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", frac, width = DECIMALS);
            padded.parse().map_err(|_| invalid())?
        };
        whole
            .checked_mul(TOKEN_UNIT)
            .and_then(|w| w.checked_add(frac_raw))
            .map(Self)
            .ok_or_else(invalid)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Whole-token decimal form, the inverse of [`parse_units`](Self::parse_units).
    /// Trailing fractional zeros are dropped.
    pub fn to_units_string(&self) -> String {
        let whole = self.0 / TOKEN_UNIT;
        let frac = self.0 % TOKEN_UNIT;
        if frac == 0 {
            return whole.to_string();
        }
        let frac = format!("{:0>width$}", frac, width = DECIMALS);
        format!("{}.{}", whole, frac.trim_end_matches('0'))
    }
}

impl Add for TokenAmount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for TokenAmount {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} raw", self.0)
    }
}
