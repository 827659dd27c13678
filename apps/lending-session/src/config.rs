// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! The session is configured at construction. [`SessionConfig::from_env`]
//! builds a configuration from the environment.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `LENDING_RPC_URL` | JSON-RPC endpoint of the chain | Required |
//! | `LENDING_CHAIN_ID` | Chain ID | Required |
//! | `LENDING_NETWORK_NAME` | Display name of the network | `EVM` |
//! | `LENDING_EXPLORER_URL` | Block explorer base URL | `https://etherscan.io` |
//! | `LENDING_CONTRACT_ADDRESS` | Lending contract address | Required |
//! | `LENDING_CONFIRMATION_TIMEOUT_SECS` | Max wait for inclusion | `120` |
//! | `LENDING_RECEIPT_POLL_MS` | Receipt polling interval | `2000` |
//! | `LENDING_DROPPED_AFTER_POLLS` | Not-found polls before a tx counts as dropped | `5` |
//! | `LENDING_PRIVATE_KEY` | Hex key for the local connector (binary only) | - |
//! | `LENDING_KEY_PEM` | PEM key file for the local connector (binary only) | - |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::Address;

use crate::blockchain::NetworkConfig;

pub const RPC_URL_ENV: &str = "LENDING_RPC_URL";
pub const CHAIN_ID_ENV: &str = "LENDING_CHAIN_ID";
pub const NETWORK_NAME_ENV: &str = "LENDING_NETWORK_NAME";
pub const EXPLORER_URL_ENV: &str = "LENDING_EXPLORER_URL";
pub const CONTRACT_ADDRESS_ENV: &str = "LENDING_CONTRACT_ADDRESS";
pub const CONFIRMATION_TIMEOUT_ENV: &str = "LENDING_CONFIRMATION_TIMEOUT_SECS";
pub const RECEIPT_POLL_ENV: &str = "LENDING_RECEIPT_POLL_MS";
pub const DROPPED_AFTER_POLLS_ENV: &str = "LENDING_DROPPED_AFTER_POLLS";
pub const PRIVATE_KEY_ENV: &str = "LENDING_PRIVATE_KEY";
pub const KEY_PEM_ENV: &str = "LENDING_KEY_PEM";

/// Default maximum wait for a transaction to be included.
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Default interval between receipt polls.
pub const DEFAULT_RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Default number of consecutive not-found polls before a transaction is
/// considered dropped.
pub const DEFAULT_DROPPED_AFTER_POLLS: u32 = 5;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub network: NetworkConfig,
    /// Lending contract the session binds to.
    pub contract_address: Address,
    /// Maximum wait for inclusion before a transaction fails with a timeout.
    pub confirmation_timeout: Duration,
    pub receipt_poll_interval: Duration,
    pub dropped_after_polls: u32,
}

impl SessionConfig {
    pub fn new(network: NetworkConfig, contract_address: Address) -> Self {
        Self {
            network,
            contract_address,
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
            receipt_poll_interval: DEFAULT_RECEIPT_POLL_INTERVAL,
            dropped_after_polls: DEFAULT_DROPPED_AFTER_POLLS,
        }
    }

    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }

    pub fn with_receipt_poll_interval(mut self, interval: Duration) -> Self {
        self.receipt_poll_interval = interval;
        self
    }

    pub fn with_dropped_after_polls(mut self, polls: u32) -> Self {
        self.dropped_after_polls = polls.max(1);
        self
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let rpc_url = required(RPC_URL_ENV)?;
        url::Url::parse(&rpc_url).map_err(|e| ConfigError::Invalid {
            name: RPC_URL_ENV,
            reason: e.to_string(),
        })?;

        let chain_id = parse_var(CHAIN_ID_ENV, &required(CHAIN_ID_ENV)?)?;

        let contract_address = Address::from_str(required(CONTRACT_ADDRESS_ENV)?.trim())
            .map_err(|e| ConfigError::Invalid {
                name: CONTRACT_ADDRESS_ENV,
                reason: e.to_string(),
            })?;

        let network = NetworkConfig {
            name: lookup(NETWORK_NAME_ENV).unwrap_or_else(|| "EVM".to_string()),
            chain_id,
            rpc_url,
            explorer_url: lookup(EXPLORER_URL_ENV)
                .unwrap_or_else(|| "https://etherscan.io".to_string()),
        };

        let mut config = Self::new(network, contract_address);

        if let Some(secs) = lookup(CONFIRMATION_TIMEOUT_ENV) {
            let secs: u64 = parse_var(CONFIRMATION_TIMEOUT_ENV, &secs)?;
            config.confirmation_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = lookup(RECEIPT_POLL_ENV) {
            let ms: u64 = parse_var(RECEIPT_POLL_ENV, &ms)?;
            config.receipt_poll_interval = Duration::from_millis(ms.max(1));
        }
        if let Some(polls) = lookup(DROPPED_AFTER_POLLS_ENV) {
            config = config.with_dropped_after_polls(parse_var(DROPPED_AFTER_POLLS_ENV, &polls)?);
        }

        Ok(config)
    }
}

fn parse_var<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}
