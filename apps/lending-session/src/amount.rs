// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fixed-point-18 decimal amounts.
//!
//! Every amount that crosses the contract boundary (lend/borrow/repay
//! amounts, the interest rate, the native balance) is an unsigned 256-bit
//! integer scaled by 10^18. [`Fixed18`] keeps that integer and renders the
//! exact decimal, so parsing and formatting never lose precision.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::U256;
use serde::{Serialize, Serializer};

/// Number of fractional digits carried by every on-chain amount.
pub const DECIMALS: usize = 18;

/// Errors raised while validating a user-supplied amount.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("amount is not a decimal number: {0}")]
    Malformed(String),

    #[error("amount must be greater than zero")]
    NonPositive,

    #[error("amount must be a finite number")]
    NonFinite,

    #[error("amount has {digits} fractional digits (max 18)")]
    ExcessPrecision { digits: usize },

    #[error("amount does not fit in 256 bits")]
    Overflow,
}

/// A non-negative decimal stored as an integer scaled by 10^18.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Fixed18(U256);

impl Fixed18 {
    pub const ZERO: Self = Self(U256::ZERO);

    /// Wrap a raw fixed-point integer as returned by the chain.
    pub const fn from_raw(raw: U256) -> Self {
        Self(raw)
    }

    /// The scaled integer, exactly as it is sent to the contract.
    pub const fn raw(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Parse a decimal string that may be zero (balances, rates).
    ///
    /// Fractional digits beyond the 18th are rejected unless they are
    /// trailing zeros; nothing is ever rounded or truncated.
    pub fn parse(input: &str) -> Result<Self, AmountError> {
        let amount = input.trim();
        if amount.is_empty() {
            return Err(AmountError::Empty);
        }

        let lowered = amount.to_ascii_lowercase();
        let unsigned = lowered.trim_start_matches(['+', '-']);
        if matches!(unsigned, "nan" | "inf" | "infinity") {
            return Err(AmountError::NonFinite);
        }
        if amount.starts_with('-') {
            return Err(AmountError::NonPositive);
        }

        let (whole, fraction) = match amount.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (amount, ""),
        };

        let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction)
        {
            return Err(AmountError::Malformed(amount.to_string()));
        }

        let fraction = fraction.trim_end_matches('0');
        if fraction.len() > DECIMALS {
            return Err(AmountError::ExcessPrecision {
                digits: fraction.len(),
            });
        }

        let whole = if whole.is_empty() {
            U256::ZERO
        } else {
            U256::from_str_radix(whole, 10).map_err(|_| AmountError::Overflow)?
        };

        let padded = format!("{:0<width$}", fraction, width = DECIMALS);
        let fraction = U256::from_str_radix(&padded, 10)
            .map_err(|_| AmountError::Malformed(amount.to_string()))?;

        whole
            .checked_mul(scale())
            .and_then(|w| w.checked_add(fraction))
            .map(Self)
            .ok_or(AmountError::Overflow)
    }

    /// Parse an amount that is about to be submitted: zero is rejected.
    pub fn parse_positive(input: &str) -> Result<Self, AmountError> {
        let amount = Self::parse(input)?;
        if amount.is_zero() {
            return Err(AmountError::NonPositive);
        }
        Ok(amount)
    }
}

fn scale() -> U256 {
    U256::from(10u64).pow(U256::from(DECIMALS))
}

impl fmt::Display for Fixed18 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let divisor = scale();
        let whole = self.0 / divisor;
        let remainder = self.0 % divisor;

        if remainder.is_zero() {
            return write!(f, "{}", whole);
        }

        let decimal_str = format!("{:0>width$}", remainder, width = DECIMALS);
        write!(f, "{}.{}", whole, decimal_str.trim_end_matches('0'))
    }
}

impl FromStr for Fixed18 {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Fixed18 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
