// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Classified errors surfaced to the UI layer.
//!
//! Every failure the session can produce is a [`SessionError`]. The UI only
//! needs [`SessionError::category`] to pick a message; the variant carries the
//! detail for logs.

use serde::Serialize;

use crate::amount::AmountError;
use crate::signer::{ConnectError, SignerError};

/// Errors returned by [`crate::session::SessionManager`] operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    #[error("Wallet connection rejected: {0}")]
    ConnectorRejected(ConnectError),

    #[error("Wallet reported an invalid account address: {0:?}")]
    AccountMismatch(String),

    #[error("Failed to read account state: {0}")]
    ReadFailure(String),

    #[error("Invalid amount: {0}")]
    ValidationFailure(#[from] AmountError),

    #[error("Transaction was not accepted: {0}")]
    SubmissionRejected(SignerError),

    #[error("Transaction {tx_reference} reverted in block {block_number}")]
    TransactionReverted {
        tx_reference: String,
        block_number: u64,
    },

    #[error("Transaction {tx_reference} was dropped or replaced")]
    TransactionDropped { tx_reference: String },

    #[error("Transaction {tx_reference} not confirmed after {waited_secs}s; check its status on-chain")]
    ConfirmationTimeout {
        tx_reference: String,
        waited_secs: u64,
    },

    #[error("No wallet is connected")]
    NotConnected,

    #[error("An account refresh is already in progress")]
    RefreshBusy,

    #[error("Session changed while the operation was in flight; result discarded")]
    Superseded,
}

/// User-facing message category for an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Rejected,
    Network,
    InvalidInput,
    Reverted,
    TimedOut,
    /// Operation not allowed in the current session state.
    State,
}

impl ErrorCategory {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Rejected => "The request was rejected by your wallet.",
            Self::Network => "A network error occurred. Please try again.",
            Self::InvalidInput => "Please enter a valid positive amount.",
            Self::Reverted => "The transaction failed on-chain.",
            Self::TimedOut => {
                "The transaction is taking longer than expected. Check its status before retrying."
            }
            Self::State => "Please connect your wallet first.",
        }
    }
}

impl SessionError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConnectorRejected(ConnectError::Network(_)) => ErrorCategory::Network,
            Self::ConnectorRejected(_) | Self::AccountMismatch(_) => ErrorCategory::Rejected,
            Self::ReadFailure(_) => ErrorCategory::Network,
            Self::ValidationFailure(_) => ErrorCategory::InvalidInput,
            Self::SubmissionRejected(SignerError::Transport(_)) => ErrorCategory::Network,
            Self::SubmissionRejected(_) => ErrorCategory::Rejected,
            Self::TransactionReverted { .. } | Self::TransactionDropped { .. } => {
                ErrorCategory::Reverted
            }
            Self::ConfirmationTimeout { .. } => ErrorCategory::TimedOut,
            Self::NotConnected | Self::RefreshBusy | Self::Superseded => ErrorCategory::State,
        }
    }

    /// Whether the operation can be retried as-is without risking a double
    /// submission.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectorRejected(_)
                | Self::AccountMismatch(_)
                | Self::ReadFailure(_)
                | Self::RefreshBusy
                | Self::Superseded
        )
    }
}

pub type SessionResult<T> = Result<T, SessionError>;
