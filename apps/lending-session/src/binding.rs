// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Typed boundary over the remote lending contract.

use alloy::primitives::{Address, TxHash};
use tracing::{debug, warn};

use crate::amount::Fixed18;
use crate::blockchain::lending;
use crate::error::{SessionError, SessionResult};
use crate::lifecycle::TxKind;
use crate::signer::{SharedSigner, TxInclusion};

/// One lending contract bound to the current session's signer.
///
/// The contract address and method schema are fixed for the binding's
/// lifetime; a new signer means a new binding.
#[derive(Clone)]
pub struct ContractBinding {
    contract_address: Address,
    signer: SharedSigner,
}

impl ContractBinding {
    pub fn new(contract_address: Address, signer: SharedSigner) -> Self {
        Self {
            contract_address,
            signer,
        }
    }

    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    /// Read `calculateInterestRate()` as a fixed-point-18 decimal.
    ///
    /// # Returns
    /// * `Ok(Fixed18)` - The rate, e.g. `0.05` for a raw `50000000000000000`
    /// * `Err(SessionError::ReadFailure)` - If the call fails or returns
    ///   data that does not decode as a `uint256`
    pub async fn read_interest_rate(&self) -> SessionResult<Fixed18> {
        let data = self
            .signer
            .call(self.contract_address, lending::encode_interest_rate_call())
            .await
            .map_err(|e| SessionError::ReadFailure(format!("calculateInterestRate: {}", e)))?;

        let raw = lending::decode_interest_rate(&data).map_err(|e| {
            SessionError::ReadFailure(format!("calculateInterestRate returned bad data: {}", e))
        })?;

        Ok(Fixed18::from_raw(raw))
    }

    /// Native balance of `account`.
    pub async fn read_native_balance(&self, account: Address) -> SessionResult<Fixed18> {
        self.signer
            .native_balance(account)
            .await
            .map(Fixed18::from_raw)
            .map_err(|e| SessionError::ReadFailure(format!("balance of {}: {}", account, e)))
    }

    /// Submit `kind` with `amount`.
    ///
    /// Returns once the transport has accepted the transaction into its
    /// pending pool; this is not confirmation.
    ///
    /// # Arguments
    /// * `kind` - Which contract method to invoke
    /// * `amount` - Already validated; sent as its raw scaled integer
    ///
    /// # Returns
    /// * `Ok(TxHash)` - The transaction reference
    /// * `Err(SessionError::SubmissionRejected)` - If signing was refused,
    ///   the call reverted during estimation, or the transport failed
    pub async fn call(&self, kind: TxKind, amount: Fixed18) -> SessionResult<TxHash> {
        let raw = amount.raw();
        let data = match kind {
            TxKind::Lend => lending::encode_lend(raw),
            TxKind::Borrow => lending::encode_borrow(raw),
            TxKind::Repay => lending::encode_repay(raw),
        };

        match self.signer.send_transaction(self.contract_address, data).await {
            Ok(hash) => {
                debug!(kind = ?kind, amount = %amount, tx_hash = ?hash, "Transaction accepted");
                Ok(hash)
            }
            Err(e) => {
                warn!(kind = ?kind, amount = %amount, error = %e, "Transaction not accepted");
                Err(SessionError::SubmissionRejected(e))
            }
        }
    }

    /// Current inclusion status of a submitted transaction.
    pub async fn transaction_status(&self, hash: TxHash) -> SessionResult<TxInclusion> {
        self.signer
            .transaction_status(hash)
            .await
            .map_err(|e| SessionError::ReadFailure(e.to_string()))
    }
}
