// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Transaction Lifecycle
//!
//! Tracks one submitted lend/borrow/repay call from acceptance to a terminal
//! state:
//!
//! ```text
//! Submitted -> Pending -> Confirmed
//!                      -> Failed (reverted | dropped | timeout)
//! ```
//!
//! A [`PendingTransaction`] only exists once the transport accepted the
//! transaction, so it always carries a reference. Each transaction gets one
//! tracker task that polls the transport every `receipt_poll_interval` until
//! the transaction settles or `confirmation_timeout` elapses. Failed
//! transactions are never resubmitted.
//!
//! ## Shutdown
//!
//! Trackers stop when the session's `CancellationToken` fires. An abandoned
//! transaction keeps its last state and [`TransactionHandle::settled`]
//! returns `None`.

use std::fmt;
use std::time::Duration;

use alloy::primitives::TxHash;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::amount::Fixed18;
use crate::binding::ContractBinding;
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::signer::{TxInclusion, TxReceipt};

/// State-mutating contract methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Lend,
    Borrow,
    Repay,
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Lend => "lend",
            Self::Borrow => "borrow",
            Self::Repay => "repay",
        })
    }
}

/// Why a transaction ended in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxFailure {
    /// Included, but execution reverted.
    Reverted { block_number: u64, gas_used: u64 },
    /// Disappeared from the transport (dropped or replaced).
    Dropped,
    /// Not included within the configured wait. The on-chain outcome is
    /// unknown.
    Timeout { waited: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    Submitted,
    Pending,
    Confirmed(TxReceipt),
    Failed(TxFailure),
}

impl TxState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed(_) | Self::Failed(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Pending => "pending",
            Self::Confirmed(_) => "confirmed",
            Self::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("illegal transaction transition {from} -> {to}")]
pub struct IllegalTransition {
    pub from: &'static str,
    pub to: &'static str,
}

/// One submitted state-mutating call.
#[derive(Debug, Clone)]
pub struct PendingTransaction {
    id: Uuid,
    kind: TxKind,
    amount: Fixed18,
    tx_reference: TxHash,
    explorer_url: String,
    state: TxState,
    history: Vec<TxState>,
    submitted_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PendingTransaction {
    /// Record a transaction the transport has just accepted.
    pub fn submitted(
        kind: TxKind,
        amount: Fixed18,
        tx_reference: TxHash,
        explorer_url: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            kind,
            amount,
            tx_reference,
            explorer_url,
            state: TxState::Submitted,
            history: vec![TxState::Submitted],
            submitted_at: now,
            updated_at: now,
        }
    }

    /// Move to `next`, enforcing `Submitted -> Pending -> terminal`.
    pub fn transition(&mut self, next: TxState) -> Result<(), IllegalTransition> {
        let allowed = matches!(
            (self.state, next),
            (TxState::Submitted, TxState::Pending)
                | (TxState::Pending, TxState::Confirmed(_))
                | (TxState::Pending, TxState::Failed(_))
        );
        if !allowed {
            return Err(IllegalTransition {
                from: self.state.name(),
                to: next.name(),
            });
        }

        self.state = next;
        self.history.push(next);
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> TxKind {
        self.kind
    }

    pub fn amount(&self) -> Fixed18 {
        self.amount
    }

    pub fn tx_reference(&self) -> TxHash {
        self.tx_reference
    }

    pub fn explorer_url(&self) -> &str {
        &self.explorer_url
    }

    pub fn state(&self) -> TxState {
        self.state
    }

    /// Every state this transaction has been in, oldest first.
    pub fn history(&self) -> &[TxState] {
        &self.history
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// The classified error for a failed transaction.
    pub fn error(&self) -> Option<SessionError> {
        let tx_reference = format!("{:?}", self.tx_reference);
        match self.state {
            TxState::Failed(TxFailure::Reverted { block_number, .. }) => {
                Some(SessionError::TransactionReverted {
                    tx_reference,
                    block_number,
                })
            }
            TxState::Failed(TxFailure::Dropped) => {
                Some(SessionError::TransactionDropped { tx_reference })
            }
            TxState::Failed(TxFailure::Timeout { waited }) => {
                Some(SessionError::ConfirmationTimeout {
                    tx_reference,
                    waited_secs: waited.as_secs(),
                })
            }
            _ => None,
        }
    }
}

/// Caller-side view of a tracked transaction.
#[derive(Debug, Clone)]
pub struct TransactionHandle {
    id: Uuid,
    tx_reference: TxHash,
    receiver: watch::Receiver<PendingTransaction>,
}

impl TransactionHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn tx_reference(&self) -> TxHash {
        self.tx_reference
    }

    /// Latest observed state of the transaction.
    pub fn current(&self) -> PendingTransaction {
        self.receiver.borrow().clone()
    }

    /// Wait until the transaction is confirmed or failed.
    ///
    /// Returns `None` if tracking was abandoned (session ended) first.
    pub async fn settled(&self) -> Option<PendingTransaction> {
        let mut receiver = self.receiver.clone();
        let settled = receiver
            .wait_for(|tx| tx.state().is_terminal())
            .await
            .ok()
            .map(|tx| tx.clone());
        settled
    }
}

/// Polling parameters for tracker tasks.
#[derive(Debug, Clone, Copy)]
pub struct TrackerSettings {
    pub confirmation_timeout: Duration,
    pub poll_interval: Duration,
    pub dropped_after_polls: u32,
}

impl From<&SessionConfig> for TrackerSettings {
    fn from(config: &SessionConfig) -> Self {
        Self {
            confirmation_timeout: config.confirmation_timeout,
            poll_interval: config.receipt_poll_interval,
            dropped_after_polls: config.dropped_after_polls.max(1),
        }
    }
}

/// Spawn the tracker for a freshly submitted transaction.
pub fn track(
    transaction: PendingTransaction,
    binding: ContractBinding,
    settings: TrackerSettings,
    shutdown: CancellationToken,
) -> TransactionHandle {
    let handle_id = transaction.id();
    let tx_reference = transaction.tx_reference();
    let (sender, receiver) = watch::channel(transaction);

    let tracker = Tracker {
        binding,
        settings,
        shutdown,
    };
    tokio::spawn(tracker.run(sender));

    TransactionHandle {
        id: handle_id,
        tx_reference,
        receiver,
    }
}

struct Tracker {
    binding: ContractBinding,
    settings: TrackerSettings,
    shutdown: CancellationToken,
}

impl Tracker {
    async fn run(self, sender: watch::Sender<PendingTransaction>) {
        let tx_reference = sender.borrow().tx_reference();
        advance(&sender, TxState::Pending);

        let wait = tokio::time::timeout(
            self.settings.confirmation_timeout,
            self.wait_for_inclusion(tx_reference),
        );

        let outcome = tokio::select! {
            result = wait => match result {
                Ok(state) => state,
                Err(_) => TxState::Failed(TxFailure::Timeout {
                    waited: self.settings.confirmation_timeout,
                }),
            },
            _ = self.shutdown.cancelled() => {
                info!(tx_hash = ?tx_reference, "Session ended, transaction tracking abandoned");
                return;
            }
        };

        advance(&sender, outcome);
    }

    /// Poll until the transport reports inclusion or the transaction
    /// disappears.
    async fn wait_for_inclusion(&self, tx_reference: TxHash) -> TxState {
        let mut not_found = 0u32;

        loop {
            match self.binding.transaction_status(tx_reference).await {
                Ok(TxInclusion::Included(receipt)) if receipt.success => {
                    return TxState::Confirmed(receipt);
                }
                Ok(TxInclusion::Included(receipt)) => {
                    return TxState::Failed(TxFailure::Reverted {
                        block_number: receipt.block_number,
                        gas_used: receipt.gas_used,
                    });
                }
                Ok(TxInclusion::Pending) => not_found = 0,
                Ok(TxInclusion::NotFound) => {
                    not_found += 1;
                    if not_found >= self.settings.dropped_after_polls {
                        return TxState::Failed(TxFailure::Dropped);
                    }
                }
                Err(e) => {
                    warn!(tx_hash = ?tx_reference, error = %e, "Status poll failed, will retry");
                }
            }

            tokio::time::sleep(self.settings.poll_interval).await;
        }
    }
}

fn advance(sender: &watch::Sender<PendingTransaction>, next: TxState) {
    sender.send_modify(|tx| match tx.transition(next) {
        Ok(()) => match next {
            TxState::Failed(failure) => warn!(
                id = %tx.id(),
                kind = %tx.kind(),
                tx_hash = ?tx.tx_reference(),
                failure = ?failure,
                "Transaction failed"
            ),
            _ => info!(
                id = %tx.id(),
                kind = %tx.kind(),
                tx_hash = ?tx.tx_reference(),
                state = next.name(),
                "Transaction state changed"
            ),
        },
        Err(e) => debug!(id = %tx.id(), error = %e, "Ignored transition"),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedSigner, CONTRACT};
    use std::sync::Arc;

    fn receipt(success: bool) -> TxReceipt {
        TxReceipt {
            block_number: 42,
            gas_used: 21_000,
            success,
        }
    }

    fn pending_tx() -> PendingTransaction {
        PendingTransaction::submitted(
            TxKind::Lend,
            Fixed18::parse_positive("10").unwrap(),
            TxHash::repeat_byte(0xab),
            "https://explorer/tx/0xab".to_string(),
        )
    }

    fn settings(timeout_secs: u64) -> TrackerSettings {
        TrackerSettings {
            confirmation_timeout: Duration::from_secs(timeout_secs),
            poll_interval: Duration::from_secs(1),
            dropped_after_polls: 3,
        }
    }

    fn start(signer: &Arc<ScriptedSigner>, settings: TrackerSettings) -> TransactionHandle {
        track(
            pending_tx(),
            ContractBinding::new(CONTRACT, signer.clone()),
            settings,
            CancellationToken::new(),
        )
    }

    #[test]
    fn transition_order_is_enforced() {
        let mut tx = pending_tx();
        assert_eq!(tx.state(), TxState::Submitted);

        assert!(tx.transition(TxState::Confirmed(receipt(true))).is_err());
        tx.transition(TxState::Pending).unwrap();
        assert!(tx.transition(TxState::Pending).is_err());
        tx.transition(TxState::Confirmed(receipt(true))).unwrap();
        assert!(tx.transition(TxState::Failed(TxFailure::Dropped)).is_err());

        assert_eq!(
            tx.history(),
            &[
                TxState::Submitted,
                TxState::Pending,
                TxState::Confirmed(receipt(true))
            ]
        );
    }

    #[test]
    fn failure_maps_to_classified_error() {
        let mut tx = pending_tx();
        tx.transition(TxState::Pending).unwrap();
        assert!(tx.error().is_none());

        tx.transition(TxState::Failed(TxFailure::Timeout {
            waited: Duration::from_secs(30),
        }))
        .unwrap();
        assert!(matches!(
            tx.error(),
            Some(SessionError::ConfirmationTimeout { waited_secs: 30, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn confirms_after_inclusion() {
        let signer = Arc::new(ScriptedSigner::new());
        signer.push_status(TxInclusion::Pending);
        signer.push_status(TxInclusion::Included(receipt(true)));

        let handle = start(&signer, settings(30));
        let settled = handle.settled().await.unwrap();

        assert_eq!(settled.state(), TxState::Confirmed(receipt(true)));
        assert_eq!(
            settled.history(),
            &[
                TxState::Submitted,
                TxState::Pending,
                TxState::Confirmed(receipt(true))
            ]
        );
        assert!(settled.error().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn reverted_inclusion_fails() {
        let signer = Arc::new(ScriptedSigner::new());
        signer.push_status(TxInclusion::Included(receipt(false)));

        let settled = start(&signer, settings(30)).settled().await.unwrap();
        assert_eq!(
            settled.state(),
            TxState::Failed(TxFailure::Reverted {
                block_number: 42,
                gas_used: 21_000
            })
        );
        assert!(matches!(
            settled.error(),
            Some(SessionError::TransactionReverted { block_number: 42, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_not_found_means_dropped() {
        let signer = Arc::new(ScriptedSigner::new());
        for _ in 0..3 {
            signer.push_status(TxInclusion::NotFound);
        }

        let settled = start(&signer, settings(30)).settled().await.unwrap();
        assert_eq!(settled.state(), TxState::Failed(TxFailure::Dropped));
    }

    #[tokio::test(start_paused = true)]
    async fn poll_errors_keep_polling() {
        let signer = Arc::new(ScriptedSigner::new());
        signer.push_status_error(crate::signer::SignerError::Transport("502".into()));
        signer.push_status(TxInclusion::Included(receipt(true)));

        let settled = start(&signer, settings(30)).settled().await.unwrap();
        assert!(matches!(settled.state(), TxState::Confirmed(_)));
        assert_eq!(signer.status_polls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_at_configured_bound() {
        let signer = Arc::new(ScriptedSigner::new());
        // Scripted signer reports Pending once its queue is empty.
        let started = tokio::time::Instant::now();

        let settled = start(&signer, settings(30)).settled().await.unwrap();

        assert_eq!(started.elapsed(), Duration::from_secs(30));
        assert_eq!(
            settled.state(),
            TxState::Failed(TxFailure::Timeout {
                waited: Duration::from_secs(30)
            })
        );
        assert_eq!(
            settled.history().iter().map(TxState::name).collect::<Vec<_>>(),
            vec!["submitted", "pending", "failed"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_abandons_tracking() {
        let signer = Arc::new(ScriptedSigner::new());
        let shutdown = CancellationToken::new();
        let handle = track(
            pending_tx(),
            ContractBinding::new(CONTRACT, signer.clone()),
            settings(30),
            shutdown.clone(),
        );

        tokio::time::sleep(Duration::from_secs(2)).await;
        shutdown.cancel();

        assert!(handle.settled().await.is_none());
        assert_eq!(handle.current().state(), TxState::Pending);
    }
}
