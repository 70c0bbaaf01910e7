//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::AegisConfig;
use super::secret::secret_string;
use crate::domain::errors::AegisError;
use crate::domain::result::Result;
use crate::governance::anonymizer::ConflictStrategy;
use crate::governance::config::{DetectionEngineKind, RemoteDetectionConfig};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into AegisConfig
/// 4. Applies environment variable overrides (AEGIS_* prefix)
/// 5. Validates the configuration, including every operator rule
///
/// # Errors
///
/// Returns [`AegisError::Configuration`] if the file cannot be read or parsed,
/// a referenced environment variable is missing, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use aegis::config::loader::load_config;
///
/// let config = load_config("aegis.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<AegisConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(AegisError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        AegisError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_from_str(&contents)
}

/// Loads configuration from TOML content
///
/// Performs the same substitution, override and validation steps as
/// [`load_config`].
pub fn load_config_from_str(contents: &str) -> Result<AegisConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: AegisConfig = toml::from_str(&contents)
        .map_err(|e| AegisError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        AegisError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| AegisError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(AegisError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AegisError::Configuration(format!("Invalid {name} value: {value}")))
}

/// Applies environment variable overrides using AEGIS_* prefix
///
/// Environment variables follow the pattern: AEGIS_<SECTION>_<KEY>
/// For example: AEGIS_SERVER_PORT, AEGIS_DETECTION_ENGINE
fn apply_env_overrides(config: &mut AegisConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("AEGIS_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Server overrides
    if let Ok(val) = std::env::var("AEGIS_SERVER_HOST") {
        config.server.host = val;
    }
    if let Ok(val) = std::env::var("AEGIS_SERVER_PORT") {
        config.server.port = parse_env("AEGIS_SERVER_PORT", &val)?;
    }

    // Policy overrides (comma-separated, order preserved)
    if let Ok(val) = std::env::var("AEGIS_POLICY_DENIED_KEYWORDS") {
        config.policy.denied_keywords = val
            .split(',')
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
    }

    // Detection overrides
    if let Ok(val) = std::env::var("AEGIS_DETECTION_ENGINE") {
        config.detection.engine = match val.to_lowercase().as_str() {
            "regex" => DetectionEngineKind::Regex,
            "remote" => DetectionEngineKind::Remote,
            _ => {
                return Err(AegisError::Configuration(format!(
                    "Invalid AEGIS_DETECTION_ENGINE: {val}"
                )))
            }
        };
    }
    if let Ok(val) = std::env::var("AEGIS_DETECTION_LOCALE") {
        config.detection.locale = val;
    }
    if let Ok(val) = std::env::var("AEGIS_DETECTION_TIMEOUT_MS") {
        config.detection.timeout_ms = parse_env("AEGIS_DETECTION_TIMEOUT_MS", &val)?;
    }
    if let Ok(val) = std::env::var("AEGIS_DETECTION_CONFIDENCE_THRESHOLD") {
        config.detection.confidence_threshold =
            parse_env("AEGIS_DETECTION_CONFIDENCE_THRESHOLD", &val)?;
    }
    if let Ok(val) = std::env::var("AEGIS_DETECTION_PATTERN_LIBRARY") {
        config.detection.pattern_library = Some(PathBuf::from(val));
    }
    if let Ok(val) = std::env::var("AEGIS_DETECTION_REMOTE_BASE_URL") {
        config.detection.remote = Some(RemoteDetectionConfig { base_url: val });
    }

    // Anonymization overrides
    if let Ok(val) = std::env::var("AEGIS_ANONYMIZATION_CONFLICT_STRATEGY") {
        config.anonymization.conflict_strategy = match val.to_lowercase().as_str() {
            "longest_wins" => ConflictStrategy::LongestWins,
            "highest_confidence" => ConflictStrategy::HighestConfidence,
            _ => {
                return Err(AegisError::Configuration(format!(
                    "Invalid AEGIS_ANONYMIZATION_CONFLICT_STRATEGY: {val}"
                )))
            }
        };
    }
    if let Ok(val) = std::env::var("AEGIS_ANONYMIZATION_HASH_KEY") {
        config.anonymization.hash_key = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("AEGIS_ANONYMIZATION_ENCRYPTION_KEY") {
        config.anonymization.encryption_key = Some(secret_string(val));
    }

    // Logging overrides
    if let Ok(val) = std::env::var("AEGIS_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_env("AEGIS_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Ok(val) = std::env::var("AEGIS_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::governance::operators::OperatorConfig;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("AEGIS_TEST_SUBST_VAR", "test_value");
        let input = "hash_key = \"${AEGIS_TEST_SUBST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "hash_key = \"test_value\"");
        std::env::remove_var("AEGIS_TEST_SUBST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("AEGIS_TEST_MISSING_VAR");
        let input = "hash_key = \"${AEGIS_TEST_MISSING_VAR}\"";
        let result = substitute_env_vars(input);
        assert!(result.is_err());
    }

    #[test]
    fn test_substitute_skips_comments() {
        std::env::remove_var("AEGIS_TEST_COMMENTED_VAR");
        let input = "# hash_key = \"${AEGIS_TEST_COMMENTED_VAR}\"";
        assert_eq!(substitute_env_vars(input).unwrap(), input);
    }

    #[test]
    fn test_locale_override() {
        std::env::set_var("AEGIS_DETECTION_LOCALE", "de");
        let mut config = AegisConfig::default();
        apply_env_overrides(&mut config).unwrap();
        std::env::remove_var("AEGIS_DETECTION_LOCALE");
        assert_eq!(config.detection.locale, "de");
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(matches!(result, Err(AegisError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "debug"

[server]
port = 9090

[policy]
denied_keywords = ["salary", "merger"]

[anonymization.operators.US_SSN]
type = "hash"
hash_type = "sha512"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.policy.denied_keywords, vec!["salary", "merger"]);
        assert!(matches!(
            config.anonymization.operators.get("US_SSN"),
            Some(OperatorConfig::Hash { .. })
        ));
        // Explicit operator tables replace the defaults entirely
        assert!(config.anonymization.operators.get("PERSON").is_none());
    }

    #[test]
    fn test_negative_chars_to_mask_rejected_at_load() {
        let toml_content = r#"
[anonymization.operators.PHONE_NUMBER]
type = "mask"
chars_to_mask = -3
"#;
        let err = load_config_from_str(toml_content).unwrap_err();
        assert!(err.to_string().contains("chars_to_mask"));
    }
}
