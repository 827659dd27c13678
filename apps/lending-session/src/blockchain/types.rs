// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types shared by the binding and the RPC backend.

use serde::Serialize;

/// EVM network configuration, supplied at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: String,
    /// Chain ID
    pub chain_id: u64,
    /// RPC endpoint URL
    pub rpc_url: String,
    /// Block explorer URL
    pub explorer_url: String,
}

impl NetworkConfig {
    /// Explorer link for a transaction reference.
    pub fn explorer_tx_url(&self, tx_reference: &str) -> String {
        format!("{}/tx/{}", self.explorer_url.trim_end_matches('/'), tx_reference)
    }

    /// Parse the RPC endpoint.
    pub fn rpc_endpoint(&self) -> Result<url::Url, url::ParseError> {
        self.rpc_url.parse()
    }
}
