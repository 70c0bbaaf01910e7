//! Encrypt operator
//!
//! AES-256-GCM with a nonce derived from the plaintext under a subkey
//! (`SHA256(NONCE_KEY_LABEL || key)`), never under the AES key itself. Equal
//! values encrypt to equal tokens. The token is `base64(nonce || ciphertext)`.

use super::Operator;
use crate::config::SecretString;
use crate::domain::GovernanceError;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::Zeroizing;

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const NONCE_KEY_LABEL: &[u8] = b"aegis-encrypt-nonce";

fn nonce_subkey(key: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(NONCE_KEY_LABEL);
    hasher.update(key);
    hasher.finalize().to_vec()
}

/// Reversible span encryption
pub struct EncryptOperator {
    cipher: Aes256Gcm,
    nonce_key: Zeroizing<Vec<u8>>,
}

impl EncryptOperator {
    /// Create an operator from raw key bytes (must be 32 bytes)
    pub fn new(entity_type: &str, key: &[u8]) -> Result<Self, GovernanceError> {
        if key.len() != KEY_LEN {
            return Err(GovernanceError::invalid_operator(
                entity_type,
                format!("encryption key must be {KEY_LEN} bytes, got {}", key.len()),
            ));
        }

        let cipher = Aes256Gcm::new_from_slice(key).map_err(|e| {
            GovernanceError::invalid_operator(entity_type, format!("invalid encryption key: {e}"))
        })?;

        Ok(Self {
            cipher,
            nonce_key: Zeroizing::new(nonce_subkey(key)),
        })
    }

    /// Create an operator from a base64-encoded secret
    pub fn from_secret(entity_type: &str, key: &SecretString) -> Result<Self, GovernanceError> {
        let decoded = Zeroizing::new(
            BASE64
                .decode(key.expose_secret().as_str().trim())
                .map_err(|e| {
                    GovernanceError::invalid_operator(
                        entity_type,
                        format!("encryption key is not valid base64: {e}"),
                    )
                })?,
        );
        Self::new(entity_type, &decoded)
    }

    fn derive_nonce(&self, plaintext: &[u8]) -> [u8; NONCE_LEN] {
        let mut hasher = Sha256::new();
        hasher.update(self.nonce_key.as_slice());
        hasher.update(plaintext);
        let digest = hasher.finalize();

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&digest[..NONCE_LEN]);
        nonce
    }

    /// Encrypt a value into a token
    pub fn encrypt(&self, value: &str) -> Result<String, GovernanceError> {
        let nonce_bytes = self.derive_nonce(value.as_bytes());
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, value.as_bytes())
            .map_err(|e| GovernanceError::Operator {
                operator: "encrypt",
                reason: e.to_string(),
            })?;

        let mut token = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        token.extend_from_slice(&nonce_bytes);
        token.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(token))
    }

    /// Decrypt a token produced by [`encrypt`](Self::encrypt)
    pub fn decrypt(&self, token: &str) -> Result<String, GovernanceError> {
        let operator_err = |reason: String| GovernanceError::Operator {
            operator: "encrypt",
            reason,
        };

        let raw = BASE64
            .decode(token)
            .map_err(|e| operator_err(format!("invalid token encoding: {e}")))?;
        if raw.len() <= NONCE_LEN {
            return Err(operator_err("token too short".to_string()));
        }

        let (nonce_bytes, ciphertext) = raw.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|e| operator_err(format!("decryption failed: {e}")))?;

        String::from_utf8(plaintext).map_err(|e| operator_err(e.to_string()))
    }
}

impl Operator for EncryptOperator {
    fn operate(&self, value: &str) -> Result<String, GovernanceError> {
        self.encrypt(value)
    }
}

impl fmt::Debug for EncryptOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptOperator").finish_non_exhaustive()
    }
}
