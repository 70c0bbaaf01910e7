//! Secure key handling using the secrecy crate
//!
//! Hash and encryption keys are held in `Secret<SecretValue>` so they are
//! zeroized on drop and never show up in `Debug` output or logs.
//!
//! # Example
//!
//! ```rust
//! use aegis::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let key = secret_string("pepper".to_string());
//! assert_eq!(key.expose_secret().as_str(), "pepper");
//! println!("{:?}", key); // Prints: Secret([REDACTED ...])
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// Newtype wrapper for String that implements the required traits for Secret
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    /// Borrow the secret as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if the secret value is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// Type alias for a secret string
pub type SecretString = Secret<SecretValue>;

/// Helper function to create a SecretString from a String
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

/// Helper function to create an optional SecretString from an optional String
#[inline]
pub fn secret_string_opt(value: Option<String>) -> Option<SecretString> {
    value.map(secret_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_string_creation() {
        let secret = secret_string("test-key".to_string());
        assert_eq!(secret.expose_secret().as_str(), "test-key");
    }

    #[test]
    fn test_secret_string_opt() {
        assert!(secret_string_opt(Some("k".to_string())).is_some());
        assert!(secret_string_opt(None).is_none());
    }

    #[test]
    fn test_secret_debug_redacted() {
        let secret = secret_string("sensitive-data".to_string());
        let debug_output = format!("{secret:?}");
        assert!(!debug_output.contains("sensitive-data"));
    }

    #[test]
    fn test_secret_toml_roundtrip() {
        #[derive(Serialize, Deserialize)]
        struct KeyConfig {
            hash_key: SecretString,
        }

        let parsed: KeyConfig = toml::from_str(r#"hash_key = "pepper""#).unwrap();
        assert_eq!(parsed.hash_key.expose_secret().as_str(), "pepper");
        assert!(!parsed.hash_key.expose_secret().is_empty());
    }
}
