//! Anonymization operators
//!
//! An operator rewrites the content of one span. Each entity type maps to at
//! most one operator; the mapping is built once from configuration into an
//! [`OperatorTable`] and never mutated afterwards.
//!
//! Every operator parameter is validated while the table is built, so a
//! malformed rule stops the service at startup instead of failing requests.

pub mod encrypt;
pub mod hash;
pub mod mask;
pub mod replace;

use crate::config::SecretString;
use crate::domain::GovernanceError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub use encrypt::EncryptOperator;
pub use hash::{HashOperator, HashType};
pub use mask::MaskOperator;
pub use replace::ReplaceOperator;

/// Trait for span rewriting operators
pub trait Operator: Send + Sync {
    /// Rewrite the content of a span
    fn operate(&self, value: &str) -> Result<String, GovernanceError>;
}

/// Operator kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorAction {
    Replace,
    Mask,
    Hash,
    Encrypt,
}

impl fmt::Display for OperatorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace => write!(f, "replace"),
            Self::Mask => write!(f, "mask"),
            Self::Hash => write!(f, "hash"),
            Self::Encrypt => write!(f, "encrypt"),
        }
    }
}

fn default_masking_char() -> String {
    "*".to_string()
}

/// Operator configuration for one entity type, as written in TOML
///
/// ```toml
/// [anonymization.operators.PHONE_NUMBER]
/// type = "mask"
/// chars_to_mask = 6
/// masking_char = "*"
/// from_end = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OperatorConfig {
    /// Substitute the whole span with a literal (`<ENTITY_TYPE>` when unset)
    Replace {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        new_value: Option<String>,
    },

    /// Overwrite characters of the span with a masking character
    Mask {
        chars_to_mask: i64,
        #[serde(default = "default_masking_char")]
        masking_char: String,
        #[serde(default)]
        from_end: bool,
    },

    /// Keyed hex digest of the span (key from `anonymization.hash_key`)
    Hash {
        #[serde(default)]
        hash_type: HashType,
    },

    /// AES-256-GCM encryption (key from `anonymization.encryption_key`)
    Encrypt,
}

impl OperatorConfig {
    /// Shorthand for a replace rule
    pub fn replace(new_value: impl Into<String>) -> Self {
        Self::Replace {
            new_value: Some(new_value.into()),
        }
    }

    /// Shorthand for a mask rule
    pub fn mask(chars_to_mask: i64, masking_char: impl Into<String>, from_end: bool) -> Self {
        Self::Mask {
            chars_to_mask,
            masking_char: masking_char.into(),
            from_end,
        }
    }

    /// Operator kind of this configuration
    pub fn action(&self) -> OperatorAction {
        match self {
            Self::Replace { .. } => OperatorAction::Replace,
            Self::Mask { .. } => OperatorAction::Mask,
            Self::Hash { .. } => OperatorAction::Hash,
            Self::Encrypt => OperatorAction::Encrypt,
        }
    }
}

/// Key material available to keyed operators
#[derive(Default, Clone, Copy)]
pub struct OperatorKeys<'a> {
    /// Key prepended to hashed values
    pub hash_key: Option<&'a SecretString>,
    /// Base64-encoded 32-byte AES key
    pub encryption_key: Option<&'a SecretString>,
}

/// A validated rule binding an entity type to an operator
pub struct OperatorRule {
    entity_type: String,
    action: OperatorAction,
    operator: Box<dyn Operator>,
}

impl OperatorRule {
    /// Build and validate a rule
    pub fn build(
        entity_type: &str,
        config: &OperatorConfig,
        keys: OperatorKeys<'_>,
    ) -> Result<Self, GovernanceError> {
        let operator: Box<dyn Operator> = match config {
            OperatorConfig::Replace { new_value } => Box::new(ReplaceOperator::new(
                new_value
                    .clone()
                    .unwrap_or_else(|| format!("<{entity_type}>")),
            )),
            OperatorConfig::Mask {
                chars_to_mask,
                masking_char,
                from_end,
            } => Box::new(MaskOperator::new(
                entity_type,
                *chars_to_mask,
                masking_char,
                *from_end,
            )?),
            OperatorConfig::Hash { hash_type } => {
                Box::new(HashOperator::new(*hash_type, keys.hash_key))
            }
            OperatorConfig::Encrypt => {
                let key = keys.encryption_key.ok_or_else(|| {
                    GovernanceError::invalid_operator(
                        entity_type,
                        "encrypt requires anonymization.encryption_key",
                    )
                })?;
                Box::new(EncryptOperator::from_secret(entity_type, key)?)
            }
        };

        Ok(Self {
            entity_type: entity_type.to_string(),
            action: config.action(),
            operator,
        })
    }

    /// Entity type this rule applies to
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Operator kind
    pub fn action(&self) -> OperatorAction {
        self.action
    }

    /// Rewrite a span's content
    pub fn apply(&self, value: &str) -> Result<String, GovernanceError> {
        self.operator.operate(value)
    }
}

impl fmt::Debug for OperatorRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorRule")
            .field("entity_type", &self.entity_type)
            .field("action", &self.action)
            .finish()
    }
}

/// Immutable entity type → operator table
#[derive(Debug, Default)]
pub struct OperatorTable {
    rules: HashMap<String, OperatorRule>,
}

impl OperatorTable {
    /// Build a table from `(entity_type, config)` pairs
    pub fn build<'a, I>(rules: I, keys: OperatorKeys<'_>) -> Result<Self, GovernanceError>
    where
        I: IntoIterator<Item = (&'a String, &'a OperatorConfig)>,
    {
        let mut table = HashMap::new();
        for (entity_type, config) in rules {
            if entity_type.trim().is_empty() {
                return Err(GovernanceError::invalid_operator(
                    entity_type.as_str(),
                    "entity type must not be empty",
                ));
            }
            let rule = OperatorRule::build(entity_type, config, keys)?;
            table.insert(entity_type.clone(), rule);
        }
        Ok(Self { rules: table })
    }

    /// Build a table of keyless rules
    pub fn from_rules<I, S>(rules: I) -> Result<Self, GovernanceError>
    where
        I: IntoIterator<Item = (S, OperatorConfig)>,
        S: Into<String>,
    {
        let owned: Vec<(String, OperatorConfig)> =
            rules.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self::build(owned.iter().map(|(k, v)| (k, v)), OperatorKeys::default())
    }

    /// Look up the rule for an entity type
    pub fn get(&self, entity_type: &str) -> Option<&OperatorRule> {
        self.rules.get(entity_type)
    }

    /// Number of configured rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the table has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Configured entity types, sorted
    pub fn entity_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_defaults_to_entity_tag() {
        let rule = OperatorRule::build(
            "EMAIL_ADDRESS",
            &OperatorConfig::Replace { new_value: None },
            OperatorKeys::default(),
        )
        .unwrap();
        assert_eq!(rule.apply("a@b.io").unwrap(), "<EMAIL_ADDRESS>");
        assert_eq!(rule.action(), OperatorAction::Replace);
    }

    #[test]
    fn test_encrypt_without_key_is_rejected() {
        let err = OperatorRule::build("US_SSN", &OperatorConfig::Encrypt, OperatorKeys::default())
            .unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidOperatorConfig { .. }));
    }

    #[test]
    fn test_table_lookup() {
        let table = OperatorTable::from_rules([
            ("PERSON", OperatorConfig::replace("[NAME]")),
            ("PHONE_NUMBER", OperatorConfig::mask(6, "*", true)),
        ])
        .unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.get("PERSON").is_some());
        assert!(table.get("URL").is_none());
        assert_eq!(table.entity_types(), vec!["PERSON", "PHONE_NUMBER"]);
    }

    #[test]
    fn test_table_rejects_bad_mask() {
        let err = OperatorTable::from_rules([("PHONE_NUMBER", OperatorConfig::mask(-1, "*", true))])
            .unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidOperatorConfig { .. }));
    }

    #[test]
    fn test_operator_config_toml_shape() {
        #[derive(Deserialize)]
        struct Wrapper {
            operators: HashMap<String, OperatorConfig>,
        }

        let parsed: Wrapper = toml::from_str(
            r#"
[operators.PERSON]
type = "replace"
new_value = "[NAME]"

[operators.PHONE_NUMBER]
type = "mask"
chars_to_mask = 6
from_end = true

[operators.US_SSN]
type = "hash"
"#,
        )
        .unwrap();

        assert_eq!(parsed.operators["PERSON"], OperatorConfig::replace("[NAME]"));
        assert_eq!(
            parsed.operators["PHONE_NUMBER"],
            OperatorConfig::mask(6, "*", true)
        );
        assert_eq!(
            parsed.operators["US_SSN"],
            OperatorConfig::Hash {
                hash_type: HashType::Sha256
            }
        );
    }
}
