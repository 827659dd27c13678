// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet capability interfaces.
//!
//! The session never looks at a concrete wallet type. A connector hands back a
//! [`Signer`]: something that can report its account, read chain state and
//! sign-and-submit a contract call. Any backend (local key, browser wallet,
//! remote signer) is adapted to this trait.

use std::sync::Arc;

use alloy::primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;

/// Outcome of a failed wallet negotiation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectError {
    #[error("user declined the connection")]
    UserRejected,

    #[error("no compatible wallet available")]
    NoProvider,

    #[error("network error: {0}")]
    Network(String),
}

/// Failures reported by a [`Signer`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignerError {
    /// The wallet refused to sign.
    #[error("signing rejected: {0}")]
    Rejected(String),

    /// The call reverted before reaching the pending pool.
    #[error("execution reverted: {0}")]
    Reverted(String),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Receipt data for an included transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxReceipt {
    pub block_number: u64,
    pub gas_used: u64,
    /// `false` when the transaction was included but reverted.
    pub success: bool,
}

/// What the transport currently knows about a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxInclusion {
    /// Known to the node, not yet included.
    Pending,
    Included(TxReceipt),
    /// Neither a receipt nor a pool entry exists.
    NotFound,
}

/// Authenticated wallet handle.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Account address as reported by the wallet.
    async fn address(&self) -> Result<String, SignerError>;

    /// Native balance of `account`, in base units.
    async fn native_balance(&self, account: Address) -> Result<U256, SignerError>;

    /// Read-only contract call (`eth_call`).
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, SignerError>;

    /// Sign and submit a state-mutating call. Resolves once the transport has
    /// accepted the transaction into its pending pool.
    async fn send_transaction(&self, to: Address, data: Bytes) -> Result<TxHash, SignerError>;

    async fn transaction_status(&self, hash: TxHash) -> Result<TxInclusion, SignerError>;
}

pub type SharedSigner = Arc<dyn Signer>;

/// Negotiates a signer for one external wallet.
#[async_trait]
pub trait ConnectorGateway: Send + Sync {
    async fn negotiate(&self) -> Result<SharedSigner, ConnectError>;
}
