// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Scripted wallet fakes for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy::primitives::{address, Address, Bytes, TxHash, U256};
use alloy::sol_types::SolValue;
use async_trait::async_trait;
use tokio::sync::Notify;

use crate::signer::{
    ConnectError, ConnectorGateway, SharedSigner, Signer, SignerError, TxInclusion,
};

pub const CONTRACT: Address = address!("0x5425890298aed601595a70AB815c96711a31Bc65");

pub const ACCOUNT: &str = "0x742d35cc6634c0532925a3b844bc9e7595f4ab12";

/// Checksummed form of [`ACCOUNT`].
pub fn account_checksummed() -> String {
    ACCOUNT.parse::<Address>().unwrap().to_checksum(None)
}

/// Signer whose every answer is programmable.
///
/// Defaults: address [`ACCOUNT`], balance 1 ether, rate 0.05, sends succeed
/// with sequential hashes, status polls report `Pending`.
pub struct ScriptedSigner {
    address: Mutex<String>,
    balance: Mutex<Result<U256, SignerError>>,
    rate: Mutex<Result<U256, SignerError>>,
    send_error: Mutex<Option<SignerError>>,
    statuses: Mutex<VecDeque<Result<TxInclusion, SignerError>>>,
    sent: Mutex<Vec<(Address, Bytes)>>,
    balance_gate: Mutex<Option<Arc<Notify>>>,
    balance_reads: AtomicUsize,
    rate_reads: AtomicUsize,
    status_polls: AtomicUsize,
}

impl ScriptedSigner {
    pub fn new() -> Self {
        Self {
            address: Mutex::new(ACCOUNT.to_string()),
            balance: Mutex::new(Ok(U256::from(1_000_000_000_000_000_000u64))),
            rate: Mutex::new(Ok(U256::from(50_000_000_000_000_000u64))),
            send_error: Mutex::new(None),
            statuses: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            balance_gate: Mutex::new(None),
            balance_reads: AtomicUsize::new(0),
            rate_reads: AtomicUsize::new(0),
            status_polls: AtomicUsize::new(0),
        }
    }

    pub fn set_address(&self, address: &str) {
        *self.address.lock().unwrap() = address.to_string();
    }

    pub fn set_balance(&self, balance: U256) {
        *self.balance.lock().unwrap() = Ok(balance);
    }

    pub fn fail_balance(&self, error: SignerError) {
        *self.balance.lock().unwrap() = Err(error);
    }

    pub fn set_rate(&self, rate: U256) {
        *self.rate.lock().unwrap() = Ok(rate);
    }

    pub fn fail_rate(&self, error: SignerError) {
        *self.rate.lock().unwrap() = Err(error);
    }

    pub fn fail_send(&self, error: SignerError) {
        *self.send_error.lock().unwrap() = Some(error);
    }

    pub fn push_status(&self, status: TxInclusion) {
        self.statuses.lock().unwrap().push_back(Ok(status));
    }

    pub fn push_status_error(&self, error: SignerError) {
        self.statuses.lock().unwrap().push_back(Err(error));
    }

    /// Hold every balance read until the returned gate is notified.
    pub fn gate_balance(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.balance_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn sent(&self) -> Vec<(Address, Bytes)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn balance_reads(&self) -> usize {
        self.balance_reads.load(Ordering::SeqCst)
    }

    pub fn rate_reads(&self) -> usize {
        self.rate_reads.load(Ordering::SeqCst)
    }

    pub fn status_polls(&self) -> usize {
        self.status_polls.load(Ordering::SeqCst)
    }

    /// Reads, sends and polls combined.
    pub fn transport_calls(&self) -> usize {
        self.balance_reads() + self.rate_reads() + self.status_polls() + self.sent().len()
    }
}

#[async_trait]
impl Signer for ScriptedSigner {
    async fn address(&self) -> Result<String, SignerError> {
        Ok(self.address.lock().unwrap().clone())
    }

    async fn native_balance(&self, _account: Address) -> Result<U256, SignerError> {
        self.balance_reads.fetch_add(1, Ordering::SeqCst);
        let gate = self.balance_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.balance.lock().unwrap().clone()
    }

    async fn call(&self, _to: Address, _data: Bytes) -> Result<Bytes, SignerError> {
        self.rate_reads.fetch_add(1, Ordering::SeqCst);
        let rate = self.rate.lock().unwrap().clone()?;
        Ok(rate.abi_encode().into())
    }

    async fn send_transaction(&self, to: Address, data: Bytes) -> Result<TxHash, SignerError> {
        if let Some(error) = self.send_error.lock().unwrap().clone() {
            return Err(error);
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push((to, data));
        Ok(TxHash::with_last_byte(sent.len() as u8))
    }

    async fn transaction_status(&self, _hash: TxHash) -> Result<TxInclusion, SignerError> {
        self.status_polls.fetch_add(1, Ordering::SeqCst);
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(TxInclusion::Pending))
    }
}

/// Connector that hands out a fixed signer or scripted failures.
pub struct ScriptedConnector {
    signer: Mutex<Arc<ScriptedSigner>>,
    failures: Mutex<VecDeque<ConnectError>>,
    gate: Mutex<Option<Arc<Notify>>>,
    negotiations: AtomicUsize,
}

impl ScriptedConnector {
    pub fn new(signer: Arc<ScriptedSigner>) -> Self {
        Self {
            signer: Mutex::new(signer),
            failures: Mutex::new(VecDeque::new()),
            gate: Mutex::new(None),
            negotiations: AtomicUsize::new(0),
        }
    }

    /// Replace the signer handed out by later negotiations.
    pub fn set_signer(&self, signer: Arc<ScriptedSigner>) {
        *self.signer.lock().unwrap() = signer;
    }

    pub fn push_failure(&self, error: ConnectError) {
        self.failures.lock().unwrap().push_back(error);
    }

    /// Hold the next negotiations until the returned gate is notified.
    pub fn gate(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn negotiations(&self) -> usize {
        self.negotiations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectorGateway for ScriptedConnector {
    async fn negotiate(&self) -> Result<SharedSigner, ConnectError> {
        self.negotiations.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(error) = self.failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        let signer: SharedSigner = self.signer.lock().unwrap().clone();
        Ok(signer)
    }
}
