//! Hash operator

use super::Operator;
use crate::config::SecretString;
use crate::domain::GovernanceError;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};
use std::fmt;
use zeroize::Zeroizing;

/// Digest algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashType {
    #[default]
    Sha256,
    Sha512,
}

/// Replaces a span with the hex digest of `key || value`
///
/// The same value always hashes to the same token under the same key, so
/// hashed entities stay joinable across requests without being readable.
pub struct HashOperator {
    hash_type: HashType,
    key: Zeroizing<Vec<u8>>,
}

impl HashOperator {
    /// Create a new hash operator; a missing key means unkeyed hashing
    pub fn new(hash_type: HashType, key: Option<&SecretString>) -> Self {
        let key = key
            .map(|k| k.expose_secret().as_str().as_bytes().to_vec())
            .unwrap_or_default();

        Self {
            hash_type,
            key: Zeroizing::new(key),
        }
    }

    fn digest(&self, value: &str) -> String {
        match self.hash_type {
            HashType::Sha256 => {
                let mut hasher = Sha256::new();
                hasher.update(self.key.as_slice());
                hasher.update(value.as_bytes());
                format!("{:x}", hasher.finalize())
            }
            HashType::Sha512 => {
                let mut hasher = Sha512::new();
                hasher.update(self.key.as_slice());
                hasher.update(value.as_bytes());
                format!("{:x}", hasher.finalize())
            }
        }
    }
}

impl Operator for HashOperator {
    fn operate(&self, value: &str) -> Result<String, GovernanceError> {
        Ok(self.digest(value))
    }
}

impl fmt::Debug for HashOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashOperator")
            .field("hash_type", &self.hash_type)
            .field("keyed", &!self.key.is_empty())
            .finish()
    }
}
