// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JSON-RPC backed [`Signer`] using a local secp256k1 key.

use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::{Address, Bytes, TxHash, U256},
    providers::{
        fillers::{
            BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller,
            WalletFiller,
        },
        Identity, Provider, ProviderBuilder, RootProvider,
    },
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
    transports::TransportError,
};
use async_trait::async_trait;

use super::types::NetworkConfig;
use crate::signer::{Signer, SignerError, TxInclusion, TxReceipt};

/// HTTP provider with gas/nonce/chain-id fillers and a signing wallet.
type SigningProvider = FillProvider<
    JoinFill<
        JoinFill<
            Identity,
            JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
        >,
        WalletFiller<EthereumWallet>,
    >,
    RootProvider<Ethereum>,
>;

/// Signer backed by a local private key and an HTTP JSON-RPC endpoint.
pub struct RpcSigner {
    address: Address,
    provider: SigningProvider,
}

impl RpcSigner {
    /// Build a signing provider for `network`.
    pub fn new(network: &NetworkConfig, key: PrivateKeySigner) -> Result<Self, SignerError> {
        let url = network
            .rpc_endpoint()
            .map_err(|e| SignerError::Transport(format!("Invalid RPC URL: {}", e)))?;

        let address = key.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(key))
            .connect_http(url);

        Ok(Self { address, provider })
    }
}

#[async_trait]
impl Signer for RpcSigner {
    async fn address(&self) -> Result<String, SignerError> {
        Ok(self.address.to_checksum(None))
    }

    async fn native_balance(&self, account: Address) -> Result<U256, SignerError> {
        self.provider
            .get_balance(account)
            .await
            .map_err(|e| classify_rpc_error(&e))
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, SignerError> {
        let tx = TransactionRequest::default()
            .from(self.address)
            .to(to)
            .input(data.into());

        self.provider
            .call(tx)
            .await
            .map_err(|e| classify_rpc_error(&e))
    }

    async fn send_transaction(&self, to: Address, data: Bytes) -> Result<TxHash, SignerError> {
        let tx = TransactionRequest::default()
            .from(self.address)
            .to(to)
            .input(data.into());

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| classify_rpc_error(&e))?;

        Ok(*pending.tx_hash())
    }

    async fn transaction_status(&self, hash: TxHash) -> Result<TxInclusion, SignerError> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| SignerError::Transport(format!("Failed to get receipt: {}", e)))?;

        if let Some(receipt) = receipt {
            return Ok(TxInclusion::Included(TxReceipt {
                block_number: receipt.block_number.unwrap_or(0),
                gas_used: receipt.gas_used as u64,
                success: receipt.status(),
            }));
        }

        let known = self
            .provider
            .get_transaction_by_hash(hash)
            .await
            .map_err(|e| SignerError::Transport(format!("Failed to get transaction: {}", e)))?;

        Ok(match known {
            Some(_) => TxInclusion::Pending,
            None => TxInclusion::NotFound,
        })
    }
}

/// EIP-1193 code for a signature the user refused.
const USER_REJECTED: i64 = 4001;

/// JSON-RPC code nodes use for `execution reverted`.
const EXECUTION_REVERTED: i64 = 3;

/// Map an RPC error onto a [`SignerError`].
///
/// Only an error response from the node or wallet can be a rejection or a
/// revert. Failures to reach the endpoint are always transport errors, no
/// matter what their message contains.
fn classify_rpc_error(error: &TransportError) -> SignerError {
    match error.as_error_resp() {
        Some(payload) => classify_error_response(payload.code, &error.to_string()),
        None => SignerError::Transport(error.to_string()),
    }
}

/// Classify a JSON-RPC error response by its code.
///
/// # Arguments
/// * `code` - The `error.code` of the response
/// * `message` - The full error text, kept in the returned error
///
/// # Returns
/// * `Rejected` for code 4001 or a wallet's "user rejected/denied" text
/// * `Reverted` for code 3, or a node that reports `execution reverted`
///   under a generic server code
/// * `Transport` otherwise
pub fn classify_error_response(code: i64, message: &str) -> SignerError {
    let lowered = message.to_ascii_lowercase();

    if code == USER_REJECTED
        || lowered.contains("user rejected")
        || lowered.contains("user denied")
    {
        SignerError::Rejected(message.to_string())
    } else if code == EXECUTION_REVERTED || lowered.contains("execution reverted") {
        SignerError::Reverted(message.to_string())
    } else {
        SignerError::Transport(message.to_string())
    }
}
