//! Integration tests for configuration loading and validation
//!
//! Tests that modify environment variables hold `ENV_MUTEX` to avoid
//! interference between tests.

use aegis::config::{load_config, DetectionEngineKind};
use aegis::domain::AegisError;
use aegis::governance::operators::OperatorConfig;
use aegis::governance::{ConflictStrategy, GovernanceOrchestrator, GovernanceRequest};
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    std::env::remove_var("AEGIS_SERVER_PORT");
    std::env::remove_var("AEGIS_POLICY_DENIED_KEYWORDS");
    std::env::remove_var("AEGIS_DETECTION_ENGINE");
    std::env::remove_var("AEGIS_ANONYMIZATION_CONFLICT_STRATEGY");
    std::env::remove_var("TEST_AEGIS_HASH_KEY");
}

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_complete_config() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[application]
log_level = "debug"

[server]
host = "127.0.0.1"
port = 8088
cors_allowed_origins = ["https://console.example.com"]

[policy]
denied_keywords = ["merger", "layoff"]

[detection]
engine = "remote"
locale = "en"
timeout_ms = 1500
confidence_threshold = 0.4

[detection.remote]
base_url = "http://analyzer:5002"

[anonymization]
conflict_strategy = "highest_confidence"
hash_key = "pepper"

[anonymization.operators.US_SSN]
type = "hash"
hash_type = "sha512"

[anonymization.operators.PERSON]
type = "replace"

[logging]
local_enabled = false
local_rotation = "hourly"
"#,
    );

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.server.port, 8088);
    assert_eq!(config.policy.denied_keywords, vec!["merger", "layoff"]);
    assert_eq!(config.detection.engine, DetectionEngineKind::Remote);
    assert_eq!(config.detection.timeout_ms, 1500);
    assert_eq!(
        config.detection.remote.as_ref().map(|r| r.base_url.as_str()),
        Some("http://analyzer:5002")
    );
    assert_eq!(
        config.anonymization.conflict_strategy,
        ConflictStrategy::HighestConfidence
    );
    assert_eq!(
        config.anonymization.operators.get("PERSON"),
        Some(&OperatorConfig::Replace { new_value: None })
    );
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_empty_config_uses_defaults() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config("");
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.server.port, 8000);
    assert_eq!(config.detection.engine, DetectionEngineKind::Regex);
    assert_eq!(config.policy.denied_keywords.len(), 5);
    assert_eq!(
        config.anonymization.operators.get("EMAIL_ADDRESS"),
        Some(&OperatorConfig::replace("[EMAIL]"))
    );
}

#[test]
fn test_env_var_substitution() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("TEST_AEGIS_HASH_KEY", "from-env");

    let file = write_config(
        r#"
[anonymization]
hash_key = "${TEST_AEGIS_HASH_KEY}"

[anonymization.operators.US_SSN]
type = "hash"
"#,
    );
    let config = load_config(file.path()).unwrap();
    cleanup_env_vars();

    use secrecy::ExposeSecret;
    let key = config.anonymization.hash_key.unwrap();
    assert_eq!(key.expose_secret().as_str(), "from-env");
}

#[test]
fn test_missing_env_var_is_configuration_error() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[anonymization]
encryption_key = "${TEST_AEGIS_UNSET_ENCRYPTION_KEY}"
"#,
    );
    let err = load_config(file.path()).unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("TEST_AEGIS_UNSET_ENCRYPTION_KEY"));
}

#[test]
fn test_env_overrides() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("AEGIS_SERVER_PORT", "9100");
    std::env::set_var("AEGIS_POLICY_DENIED_KEYWORDS", "merger, acquisition");
    std::env::set_var("AEGIS_ANONYMIZATION_CONFLICT_STRATEGY", "highest_confidence");

    let file = write_config("[server]\nport = 8000\n");
    let result = load_config(file.path());
    cleanup_env_vars();

    let config = result.unwrap();
    assert_eq!(config.server.port, 9100);
    assert_eq!(config.policy.denied_keywords, vec!["merger", "acquisition"]);
    assert_eq!(
        config.anonymization.conflict_strategy,
        ConflictStrategy::HighestConfidence
    );
}

#[test]
fn test_invalid_env_override_is_rejected() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("AEGIS_DETECTION_ENGINE", "spacy");

    let file = write_config("");
    let result = load_config(file.path());
    cleanup_env_vars();

    assert!(matches!(result, Err(AegisError::Configuration(_))));
}

#[test]
fn test_malformed_operator_fails_at_load_time() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    for body in [
        "[anonymization.operators.PHONE_NUMBER]\ntype = \"mask\"\nchars_to_mask = -2\n",
        "[anonymization.operators.PHONE_NUMBER]\ntype = \"mask\"\nchars_to_mask = 2\nmasking_char = \"**\"\n",
        "[anonymization.operators.US_SSN]\ntype = \"encrypt\"\n",
        "[anonymization]\nencryption_key = \"c2hvcnQ=\"\n[anonymization.operators.US_SSN]\ntype = \"encrypt\"\n",
        "[anonymization.operators.US_SSN]\ntype = \"hash\"\nhash_type = \"md5\"\n",
        "[anonymization.operators.US_SSN]\ntype = \"shred\"\n",
    ] {
        let file = write_config(body);
        let err = load_config(file.path()).unwrap_err();
        assert!(err.is_configuration(), "accepted: {body}");
    }
}

#[tokio::test]
async fn test_loaded_config_drives_pipeline() {
    let config = {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        cleanup_env_vars();

        let file = write_config(
            r#"
[policy]
denied_keywords = ["merger"]

[anonymization.operators.EMAIL_ADDRESS]
type = "mask"
chars_to_mask = 100
masking_char = "x"
"#,
        );
        load_config(file.path()).unwrap()
    };

    let orchestrator = GovernanceOrchestrator::from_config(&config).unwrap();

    let response = orchestrator
        .process(&GovernanceRequest::new("u", "d", "send it to a@b.io"))
        .await
        .unwrap();
    assert_eq!(response.governance_report.sanitized_prompt, "send it to xxxxxx");

    // "password" is no longer denied with a custom list
    assert!(orchestrator
        .process(&GovernanceRequest::new("u", "d", "password reset"))
        .await
        .is_ok());
    assert!(orchestrator
        .process(&GovernanceRequest::new("u", "d", "the Merger plan"))
        .await
        .is_err());
}
