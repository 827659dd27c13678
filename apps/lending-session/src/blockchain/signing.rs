// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Local key loading for the RPC signer.
//!
//! Keys arrive either as a hex string or as a PEM file (SEC1 or PKCS#8).

use alloy::signers::local::PrivateKeySigner;
use k256::SecretKey;

/// Errors raised while loading a signing key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("Invalid hex key: {0}")]
    InvalidHex(String),

    #[error("Invalid PEM: {0}")]
    InvalidPem(String),

    #[error("Invalid key format: {0}")]
    InvalidKey(String),
}

/// Create a signer from a hex private key.
///
/// # Arguments
/// * `private_key_hex` - 64 hex characters, with or without a `0x` prefix
///
/// # Returns
/// * `Ok(PrivateKeySigner)` - A signer for the key's address
/// * `Err(KeyError)` - If the hex is malformed or not a valid secp256k1 key
pub fn signer_from_hex(private_key_hex: &str) -> Result<PrivateKeySigner, KeyError> {
    let trimmed = private_key_hex.trim();
    let hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);

    let key_bytes = alloy::hex::decode(hex).map_err(|e| KeyError::InvalidHex(e.to_string()))?;

    PrivateKeySigner::from_slice(&key_bytes).map_err(|e| KeyError::InvalidKey(e.to_string()))
}

/// Create a signer from PEM-encoded key bytes.
///
/// SEC1 (`EC PRIVATE KEY`) is tried first, then PKCS#8 (`PRIVATE KEY`).
///
/// # Arguments
/// * `pem_bytes` - The PEM file contents
///
/// # Returns
/// * `Ok(PrivateKeySigner)` - A signer ready to sign transactions
/// * `Err(KeyError)` - If the PEM or the key inside it cannot be parsed
pub fn signer_from_pem(pem_bytes: &[u8]) -> Result<PrivateKeySigner, KeyError> {
    let pem_str = std::str::from_utf8(pem_bytes)
        .map_err(|e| KeyError::InvalidPem(format!("Invalid UTF-8: {}", e)))?;

    let pem = pem::parse(pem_str).map_err(|e| KeyError::InvalidPem(e.to_string()))?;

    let secret_key = SecretKey::from_sec1_der(pem.contents())
        .or_else(|_| {
            use k256::pkcs8::DecodePrivateKey;
            SecretKey::from_pkcs8_der(pem.contents())
        })
        .map_err(|e| KeyError::InvalidKey(e.to_string()))?;

    PrivateKeySigner::from_slice(&secret_key.to_bytes())
        .map_err(|e| KeyError::InvalidKey(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::pkcs8::{EncodePrivateKey, LineEnding};

    const TEST_KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    #[test]
    fn hex_key_with_and_without_prefix() {
        let plain = signer_from_hex(TEST_KEY).unwrap();
        let prefixed = signer_from_hex(&format!("0x{TEST_KEY}")).unwrap();
        assert_eq!(plain.address(), prefixed.address());
    }

    #[test]
    fn rejects_bad_hex() {
        assert!(matches!(signer_from_hex("zz"), Err(KeyError::InvalidHex(_))));
        assert!(matches!(signer_from_hex("abcd"), Err(KeyError::InvalidKey(_))));
    }

    #[test]
    fn pkcs8_pem_matches_hex_key() {
        let bytes = alloy::hex::decode(TEST_KEY).unwrap();
        let secret = SecretKey::from_slice(&bytes).unwrap();
        let pem = secret.to_pkcs8_pem(LineEnding::LF).unwrap();

        let from_pem = signer_from_pem(pem.as_bytes()).unwrap();
        let from_hex = signer_from_hex(TEST_KEY).unwrap();
        assert_eq!(from_pem.address(), from_hex.address());
    }

    #[test]
    fn rejects_garbage_pem() {
        assert!(matches!(
            signer_from_pem(b"not a pem"),
            Err(KeyError::InvalidPem(_))
        ));
    }
}
