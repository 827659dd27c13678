// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Lending contract method schema.
//!
//! The contract exposes one view (`calculateInterestRate`) and three
//! state-mutating methods taking a fixed-point-18 `uint256` amount.

use alloy::{
    primitives::{Bytes, U256},
    sol,
    sol_types::SolCall,
};

// Define the lending interface using alloy's sol! macro
sol! {
    interface ILendingPool {
        function calculateInterestRate() external view returns (uint256);
        function lend(uint256 amount) external;
        function borrow(uint256 amount) external;
        function repay(uint256 amount) external;
    }
}

/// Calldata for `calculateInterestRate()`.
pub fn encode_interest_rate_call() -> Bytes {
    ILendingPool::calculateInterestRateCall {}.abi_encode().into()
}

/// Decode the `uint256` returned by `calculateInterestRate()`.
pub fn decode_interest_rate(data: &[u8]) -> Result<U256, alloy::sol_types::Error> {
    ILendingPool::calculateInterestRateCall::abi_decode_returns(data)
}

pub fn encode_lend(amount: U256) -> Bytes {
    ILendingPool::lendCall { amount }.abi_encode().into()
}

pub fn encode_borrow(amount: U256) -> Bytes {
    ILendingPool::borrowCall { amount }.abi_encode().into()
}

pub fn encode_repay(amount: U256) -> Bytes {
    ILendingPool::repayCall { amount }.abi_encode().into()
}
