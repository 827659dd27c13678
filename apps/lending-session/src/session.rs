// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Session Manager
//!
//! Single entry point for the UI layer. Owns the wallet session, its contract
//! binding, the account snapshot and the tracked transactions.
//!
//! ## States
//!
//! ```text
//! Disconnected --connect--> Connecting --ok--> Connected
//!                                      --err-> Error
//! any --disconnect / account change--> Disconnected
//! ```
//!
//! Every transition bumps a generation counter. Async work captures the
//! generation it started under and its result is discarded
//! ([`SessionError::Superseded`]) if the session moved on meanwhile. The
//! inner lock is never held across an await.
//!
//! At most one account refresh runs per connection; a concurrent call fails
//! fast with [`SessionError::RefreshBusy`]. A refresh still in flight from an
//! ended connection never blocks the next one.

use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use alloy::primitives::Address;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::account::{AccountSnapshot, AccountStateCache};
use crate::amount::Fixed18;
use crate::binding::ContractBinding;
use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::lifecycle::{self, PendingTransaction, TrackerSettings, TransactionHandle, TxKind};
use crate::signer::{ConnectError, ConnectorGateway, SharedSigner, SignerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// One authenticated wallet connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Checksummed account address
    pub account_address: String,
    pub chain_id: u64,
    pub contract_address: String,
    /// Generation the session was established in
    pub generation: u64,
}

struct Connection {
    session: Session,
    account: Address,
    binding: ContractBinding,
    /// Cancels the trackers of this connection's transactions.
    trackers: CancellationToken,
    /// Held for the duration of one account refresh.
    refresh: Arc<tokio::sync::Mutex<()>>,
}

struct Inner {
    state: SessionState,
    generation: u64,
    connection: Option<Connection>,
    cache: AccountStateCache,
    transactions: Vec<TransactionHandle>,
    last_error: Option<SessionError>,
}

impl Inner {
    fn transition(&mut self, state: SessionState) -> u64 {
        self.state = state;
        self.generation += 1;
        self.generation
    }

    /// Drop the connection and everything derived from it.
    fn release(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.trackers.cancel();
        }
        self.cache.clear();
        self.transactions.clear();
    }
}

/// Orchestrates connect / refresh / submit for one wallet session.
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct SessionManager {
    connector: Arc<dyn ConnectorGateway>,
    config: Arc<SessionConfig>,
    inner: Arc<Mutex<Inner>>,
}

impl SessionManager {
    pub fn new(connector: Arc<dyn ConnectorGateway>, config: SessionConfig) -> Self {
        Self {
            connector,
            config: Arc::new(config),
            inner: Arc::new(Mutex::new(Inner {
                state: SessionState::Disconnected,
                generation: 0,
                connection: None,
                cache: AccountStateCache::new(),
                transactions: Vec::new(),
                last_error: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Connect the wallet, bind the contract and load the account snapshot.
    ///
    /// A no-op returning the current session when already connected. A call
    /// made while another connect is in flight supersedes it. If the session
    /// connects but the initial refresh fails, the session stays connected
    /// and the read error is returned.
    pub async fn connect(&self) -> SessionResult<Session> {
        let generation = {
            let mut inner = self.lock();
            if let Some(connection) = &inner.connection {
                debug!(account = %connection.session.account_address, "Already connected");
                return Ok(connection.session.clone());
            }
            inner.transition(SessionState::Connecting)
        };
        info!(generation, "Connecting wallet");

        let negotiated = self.negotiate().await;

        let session = {
            let mut inner = self.lock();
            if inner.generation != generation {
                warn!(generation, current = inner.generation, "Discarding stale connect result");
                return Err(SessionError::Superseded);
            }

            let (signer, account) = match negotiated {
                Ok(negotiated) => negotiated,
                Err(e) => {
                    inner.transition(SessionState::Error);
                    inner.last_error = Some(e.clone());
                    warn!(error = %e, category = ?e.category(), "Wallet connection failed");
                    return Err(e);
                }
            };

            let generation = inner.transition(SessionState::Connected);
            let session = Session {
                account_address: account.to_checksum(None),
                chain_id: self.config.network.chain_id,
                contract_address: self.config.contract_address.to_checksum(None),
                generation,
            };
            inner.connection = Some(Connection {
                session: session.clone(),
                account,
                binding: ContractBinding::new(self.config.contract_address, signer),
                trackers: CancellationToken::new(),
                refresh: Arc::new(tokio::sync::Mutex::new(())),
            });
            inner.last_error = None;
            session
        };

        info!(
            account = %session.account_address,
            chain_id = session.chain_id,
            generation = session.generation,
            "Wallet connected"
        );

        self.refresh_account_state().await?;
        Ok(session)
    }

    async fn negotiate(&self) -> SessionResult<(SharedSigner, Address)> {
        let signer = self
            .connector
            .negotiate()
            .await
            .map_err(SessionError::ConnectorRejected)?;

        let reported = signer.address().await.map_err(|e| match e {
            SignerError::Transport(message) => {
                SessionError::ConnectorRejected(ConnectError::Network(message))
            }
            _ => SessionError::ConnectorRejected(ConnectError::UserRejected),
        })?;

        let account = parse_account(&reported)?;
        Ok((signer, account))
    }

    /// Release the signer and binding, clear the snapshot and stop tracking.
    /// Idempotent.
    pub fn disconnect(&self) {
        let mut inner = self.lock();
        if inner.state == SessionState::Disconnected {
            return;
        }

        inner.release();
        inner.last_error = None;
        let generation = inner.transition(SessionState::Disconnected);
        info!(generation, "Wallet disconnected");
    }

    /// React to a provider-reported account switch.
    ///
    /// A different or missing account ends the session; the caller
    /// reconnects to bind the new signer. A switch during `Connecting`
    /// supersedes the attempt, which would otherwise bind the old signer.
    /// Returns whether the session was reset.
    pub fn handle_accounts_changed(&self, reported: Option<&str>) -> bool {
        let changed = {
            let inner = self.lock();
            match &inner.connection {
                Some(connection) => {
                    let reported = reported.and_then(|a| Address::from_str(a.trim()).ok());
                    reported != Some(connection.account)
                }
                None => inner.state == SessionState::Connecting,
            }
        };

        if changed {
            info!(reported = ?reported, "Wallet account changed");
            self.disconnect();
        }
        changed
    }

    /// Read balance and interest rate and replace the snapshot atomically.
    ///
    /// On any read failure the previous snapshot is kept.
    pub async fn refresh_account_state(&self) -> SessionResult<AccountSnapshot> {
        let (refresh, generation, binding, account, account_address) = {
            let inner = self.lock();
            let connection = inner.connection.as_ref().ok_or(SessionError::NotConnected)?;
            (
                connection.refresh.clone(),
                inner.generation,
                connection.binding.clone(),
                connection.account,
                connection.session.account_address.clone(),
            )
        };
        let _refresh = refresh
            .try_lock_owned()
            .map_err(|_| SessionError::RefreshBusy)?;

        let (balance, rate) = tokio::try_join!(
            binding.read_native_balance(account),
            binding.read_interest_rate()
        )
        .map_err(|e| {
            warn!(account = %account_address, error = %e, "Account refresh failed");
            e
        })?;

        let mut inner = self.lock();
        if inner.generation != generation {
            warn!(generation, current = inner.generation, "Discarding stale account refresh");
            return Err(SessionError::Superseded);
        }

        let snapshot = inner.cache.replace(account_address, balance, rate).clone();
        info!(
            account = %snapshot.account_address,
            balance = %snapshot.native_balance,
            interest_rate = %snapshot.interest_rate_percent,
            "Account state refreshed"
        );
        Ok(snapshot)
    }

    /// Submit a lend/borrow/repay call and start tracking it.
    ///
    /// Returns as soon as the transport accepted the transaction; observe
    /// confirmation through the returned handle. Refreshing the account
    /// state after settlement is up to the caller.
    pub async fn submit(&self, kind: TxKind, amount: &str) -> SessionResult<TransactionHandle> {
        self.submit_with_timeout(kind, amount, self.config.confirmation_timeout)
            .await
    }

    /// [`Self::submit`] with an explicit confirmation wait bound.
    pub async fn submit_with_timeout(
        &self,
        kind: TxKind,
        amount: &str,
        confirmation_timeout: Duration,
    ) -> SessionResult<TransactionHandle> {
        let amount = Fixed18::parse_positive(amount).map_err(|e| {
            warn!(kind = %kind, amount, error = %e, "Rejected invalid amount");
            SessionError::ValidationFailure(e)
        })?;

        let (generation, binding, trackers) = {
            let inner = self.lock();
            let connection = inner.connection.as_ref().ok_or(SessionError::NotConnected)?;
            (
                inner.generation,
                connection.binding.clone(),
                connection.trackers.clone(),
            )
        };

        let tx_hash = binding.call(kind, amount).await?;

        let explorer_url = self
            .config
            .network
            .explorer_tx_url(&format!("{:?}", tx_hash));
        let transaction = PendingTransaction::submitted(kind, amount, tx_hash, explorer_url);
        info!(
            id = %transaction.id(),
            kind = %kind,
            amount = %amount,
            tx_hash = ?tx_hash,
            "Transaction submitted"
        );

        let mut settings = TrackerSettings::from(self.config.as_ref());
        settings.confirmation_timeout = confirmation_timeout;
        let handle = lifecycle::track(transaction, binding, settings, trackers);

        let mut inner = self.lock();
        if inner.generation == generation {
            inner.transactions.push(handle.clone());
        } else {
            warn!(tx_hash = ?tx_hash, "Session changed during submission; transaction not tracked");
        }
        Ok(handle)
    }

    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    pub fn session(&self) -> Option<Session> {
        self.lock().connection.as_ref().map(|c| c.session.clone())
    }

    pub fn snapshot(&self) -> Option<AccountSnapshot> {
        self.lock().cache.get().cloned()
    }

    /// The error that put the session into [`SessionState::Error`].
    pub fn last_error(&self) -> Option<SessionError> {
        self.lock().last_error.clone()
    }

    /// Current status of a tracked transaction.
    pub fn transaction(&self, id: Uuid) -> Option<PendingTransaction> {
        self.lock()
            .transactions
            .iter()
            .find(|handle| handle.id() == id)
            .map(TransactionHandle::current)
    }

    /// All transactions tracked in this session, oldest first.
    pub fn transactions(&self) -> Vec<PendingTransaction> {
        self.lock()
            .transactions
            .iter()
            .map(TransactionHandle::current)
            .collect()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

fn parse_account(reported: &str) -> SessionResult<Address> {
    let trimmed = reported.trim();
    match Address::from_str(trimmed) {
        Ok(address) if !address.is_zero() => Ok(address),
        _ => Err(SessionError::AccountMismatch(reported.to_string())),
    }
}
