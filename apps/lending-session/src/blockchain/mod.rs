// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EVM integration for the lending session.
//!
//! This module provides:
//! - The lending contract method schema (`sol!` interface)
//! - A JSON-RPC signer backed by a local key
//! - A connector that turns a configured key into a signer

pub mod connector;
pub mod lending;
pub mod provider;
pub mod signing;
pub mod types;

pub use connector::{KeySource, LocalKeyConnector};
pub use provider::RpcSigner;
pub use types::NetworkConfig;
