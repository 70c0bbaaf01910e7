//! Governance pipeline configuration
//!
//! The `[policy]`, `[detection]` and `[anonymization]` sections of `aegis.toml`.

use crate::config::SecretString;
use crate::domain::GovernanceError;
use crate::governance::anonymizer::ConflictStrategy;
use crate::governance::operators::{OperatorConfig, OperatorKeys, OperatorTable};
use crate::governance::policy::DEFAULT_DENIED_KEYWORDS;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Keyword denylist configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Denied terms, matched case-insensitively in this order
    #[serde(default = "default_denied_keywords")]
    pub denied_keywords: Vec<String>,
}

fn default_denied_keywords() -> Vec<String> {
    DEFAULT_DENIED_KEYWORDS.iter().map(|s| s.to_string()).collect()
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            denied_keywords: default_denied_keywords(),
        }
    }
}

impl PolicyConfig {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if let Some(idx) = self
            .denied_keywords
            .iter()
            .position(|k| k.trim().is_empty())
        {
            return Err(format!("policy.denied_keywords[{idx}] must not be blank"));
        }
        Ok(())
    }
}

/// Which detection engine backs the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionEngineKind {
    /// Built-in regex pattern recognizer
    #[default]
    Regex,
    /// Presidio-analyzer-compatible HTTP service
    Remote,
}

impl fmt::Display for DetectionEngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regex => write!(f, "regex"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

/// Remote detection service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteDetectionConfig {
    /// Base URL of the analyzer (the client posts to `{base_url}/analyze`)
    pub base_url: String,
}

/// Detection engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Engine kind
    #[serde(default)]
    pub engine: DetectionEngineKind,

    /// Locale passed to the engine
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Maximum time to wait for the engine, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Spans below this confidence are not reported
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,

    /// Path to a pattern library TOML file (regex engine only)
    #[serde(default)]
    pub pattern_library: Option<PathBuf>,

    /// Remote engine settings (required when `engine = "remote"`)
    #[serde(default)]
    pub remote: Option<RemoteDetectionConfig>,
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_confidence_threshold() -> f32 {
    0.5
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            engine: DetectionEngineKind::default(),
            locale: default_locale(),
            timeout_ms: default_timeout_ms(),
            confidence_threshold: default_confidence_threshold(),
            pattern_library: None,
            remote: None,
        }
    }
}

impl DetectionConfig {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.locale.trim().is_empty() {
            return Err("detection.locale must not be empty".to_string());
        }
        if self.timeout_ms == 0 {
            return Err("detection.timeout_ms must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(format!(
                "detection.confidence_threshold must be within 0.0..=1.0, got {}",
                self.confidence_threshold
            ));
        }

        if let Some(ref path) = self.pattern_library {
            if !path.exists() {
                return Err(format!("Pattern library file not found: {}", path.display()));
            }
            if path.extension().and_then(|s| s.to_str()) != Some("toml") {
                return Err(format!(
                    "Pattern library must be a TOML file: {}",
                    path.display()
                ));
            }
        }

        match (self.engine, &self.remote) {
            (DetectionEngineKind::Remote, None) => {
                return Err(
                    "detection.remote is required when detection.engine = 'remote'".to_string(),
                )
            }
            (_, Some(remote)) => {
                let url = url::Url::parse(&remote.base_url).map_err(|e| {
                    format!("Invalid detection.remote.base_url '{}': {e}", remote.base_url)
                })?;
                if url.scheme() != "http" && url.scheme() != "https" {
                    return Err(format!(
                        "detection.remote.base_url must use http or https, got '{}'",
                        url.scheme()
                    ));
                }
            }
            _ => {}
        }

        Ok(())
    }
}

/// Anonymization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnonymizationConfig {
    /// How overlapping spans are resolved
    #[serde(default)]
    pub conflict_strategy: ConflictStrategy,

    /// Key for the hash operator
    #[serde(default)]
    pub hash_key: Option<SecretString>,

    /// Base64-encoded 32-byte key for the encrypt operator
    #[serde(default)]
    pub encryption_key: Option<SecretString>,

    /// Entity type → operator
    #[serde(default = "default_operators")]
    pub operators: BTreeMap<String, OperatorConfig>,
}

fn default_operators() -> BTreeMap<String, OperatorConfig> {
    BTreeMap::from([
        ("PERSON".to_string(), OperatorConfig::replace("[NAME]")),
        ("EMAIL_ADDRESS".to_string(), OperatorConfig::replace("[EMAIL]")),
        ("PHONE_NUMBER".to_string(), OperatorConfig::mask(6, "*", true)),
        ("US_SSN".to_string(), OperatorConfig::Replace { new_value: None }),
        ("CREDIT_CARD".to_string(), OperatorConfig::Replace { new_value: None }),
        ("IP_ADDRESS".to_string(), OperatorConfig::Replace { new_value: None }),
        ("URL".to_string(), OperatorConfig::Replace { new_value: None }),
    ])
}

impl Default for AnonymizationConfig {
    fn default() -> Self {
        Self {
            conflict_strategy: ConflictStrategy::default(),
            hash_key: None,
            encryption_key: None,
            operators: default_operators(),
        }
    }
}

impl AnonymizationConfig {
    /// Build the immutable operator table, validating every rule
    pub fn operator_table(&self) -> Result<OperatorTable, GovernanceError> {
        OperatorTable::build(
            self.operators.iter(),
            OperatorKeys {
                hash_key: self.hash_key.as_ref(),
                encryption_key: self.encryption_key.as_ref(),
            },
        )
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        self.operator_table().map(|_| ()).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let config = PolicyConfig::default();
        assert_eq!(config.denied_keywords.len(), 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_keyword_rejected() {
        let config = PolicyConfig {
            denied_keywords: vec!["salary".to_string(), "  ".to_string()],
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_detection_config() {
        let config = DetectionConfig::default();
        assert_eq!(config.engine, DetectionEngineKind::Regex);
        assert_eq!(config.locale, "en");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_remote_engine_requires_url() {
        let mut config = DetectionConfig {
            engine: DetectionEngineKind::Remote,
            ..DetectionConfig::default()
        };
        assert!(config.validate().is_err());

        config.remote = Some(RemoteDetectionConfig {
            base_url: "ftp://analyzer".to_string(),
        });
        assert!(config.validate().is_err());

        config.remote = Some(RemoteDetectionConfig {
            base_url: "http://localhost:5002".to_string(),
        });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_threshold_range() {
        let config = DetectionConfig {
            confidence_threshold: 1.5,
            ..DetectionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_operators() {
        let config = AnonymizationConfig::default();
        let table = config.operator_table().unwrap();
        assert_eq!(
            table.entity_types(),
            vec![
                "CREDIT_CARD",
                "EMAIL_ADDRESS",
                "IP_ADDRESS",
                "PERSON",
                "PHONE_NUMBER",
                "URL",
                "US_SSN"
            ]
        );
    }

    #[test]
    fn test_defaults_cover_builtin_entity_types() {
        use crate::governance::detector::PatternRegistry;

        let config = AnonymizationConfig::default();
        let registry = PatternRegistry::default_patterns().unwrap();
        for entity_type in registry.entity_types() {
            assert!(
                config.operators.contains_key(entity_type),
                "no default rule for {entity_type}"
            );
        }
    }

    #[test]
    fn test_invalid_operator_fails_validation() {
        let mut config = AnonymizationConfig::default();
        config
            .operators
            .insert("US_SSN".to_string(), OperatorConfig::Encrypt);
        let err = config.validate().unwrap_err();
        assert!(err.contains("US_SSN"));
    }
}
