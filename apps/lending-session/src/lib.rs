// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Lending Session - Wallet session & lending contract interaction manager
//!
//! This crate connects one wallet, binds it to a lending contract on an EVM
//! chain, keeps the account snapshot consistent and tracks lend/borrow/repay
//! transactions until they are confirmed or fail.
//!
//! ## Modules
//!
//! - `session` - Orchestrator and the only entry point for the UI layer
//! - `binding` - Typed calls against the lending contract
//! - `lifecycle` - Transaction state machine and confirmation tracking
//! - `account` - Latest balance / interest-rate snapshot
//! - `signer` - Wallet capability traits
//! - `blockchain` - alloy-based signer, connector and contract schema

pub mod account;
pub mod amount;
pub mod binding;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod session;
pub mod signer;

#[cfg(test)]
pub(crate) mod testing;

pub use amount::Fixed18;
pub use config::SessionConfig;
pub use error::{ErrorCategory, SessionError, SessionResult};
pub use lifecycle::{PendingTransaction, TransactionHandle, TxKind, TxState};
pub use session::{Session, SessionManager, SessionState};
