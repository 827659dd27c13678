// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Connector that negotiates a signer from a locally held key.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::provider::RpcSigner;
use super::signing::{signer_from_hex, signer_from_pem};
use super::types::NetworkConfig;
use crate::signer::{ConnectError, ConnectorGateway, SharedSigner};

/// Where the connector finds its private key.
#[derive(Clone)]
pub enum KeySource {
    Hex(String),
    PemFile(PathBuf),
}

impl std::fmt::Debug for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hex(_) => f.write_str("Hex(<redacted>)"),
            Self::PemFile(path) => f.debug_tuple("PemFile").field(path).finish(),
        }
    }
}

/// [`ConnectorGateway`] for a key held by this process.
pub struct LocalKeyConnector {
    network: NetworkConfig,
    key: KeySource,
}

impl LocalKeyConnector {
    pub fn new(network: NetworkConfig, key: KeySource) -> Self {
        Self { network, key }
    }
}

#[async_trait]
impl ConnectorGateway for LocalKeyConnector {
    async fn negotiate(&self) -> Result<SharedSigner, ConnectError> {
        let key = match &self.key {
            KeySource::Hex(hex) => signer_from_hex(hex),
            KeySource::PemFile(path) => {
                let bytes = tokio::fs::read(path).await.map_err(|e| {
                    warn!(path = %path.display(), error = %e, "Key file unreadable");
                    ConnectError::NoProvider
                })?;
                signer_from_pem(&bytes)
            }
        }
        .map_err(|e| {
            warn!(error = %e, "Local key rejected");
            ConnectError::NoProvider
        })?;

        debug!(network = %self.network.name, address = %key.address(), "Local signer ready");

        let signer = RpcSigner::new(&self.network, key)
            .map_err(|e| ConnectError::Network(e.to_string()))?;
        Ok(Arc::new(signer))
    }
}
