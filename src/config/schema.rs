//! Configuration schema types
//!
//! This module defines the configuration structure for Aegis. Every section
//! has defaults, so an empty file is a valid configuration that reproduces the
//! stock deployment (regex detection, default denylist, default operators).

use crate::governance::config::{AnonymizationConfig, DetectionConfig, PolicyConfig};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Main Aegis configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AegisConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Keyword denylist
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Detection engine settings
    #[serde(default)]
    pub detection: DetectionConfig,

    /// Anonymization operators
    #[serde(default)]
    pub anonymization: AnonymizationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AegisConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid, including
    /// malformed operator rules
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.server.validate()?;
        self.policy.validate()?;
        self.detection.validate()?;
        self.anonymization.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; `"*"` allows any origin
    #[serde(default = "default_cors_allowed_origins")]
    pub cors_allowed_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_allowed_origins: default_cors_allowed_origins(),
        }
    }
}

impl ServerConfig {
    /// Socket address to bind
    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| format!("Invalid server address {}:{}: {e}", self.host, self.port))
    }

    fn validate(&self) -> Result<(), String> {
        self.socket_addr()?;
        for origin in &self.cors_allowed_origins {
            if origin != "*" && url::Url::parse(origin).is_err() {
                return Err(format!("Invalid CORS origin '{origin}'"));
            }
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write JSON logs to rolling files
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Rotation policy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path is required when local_enabled = true".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_valid() {
        let config: AegisConfig = toml::from_str("").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.application.log_level, "info");
    }

    #[test]
    fn test_invalid_log_level() {
        let config: AegisConfig = toml::from_str(
            r#"
[application]
log_level = "verbose"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_host() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cors_origins() {
        let mut config = ServerConfig {
            cors_allowed_origins: vec!["https://console.example.com".to_string()],
            ..ServerConfig::default()
        };
        assert!(config.validate().is_ok());

        config.cors_allowed_origins = vec!["not an origin".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_rotation() {
        let config = LoggingConfig {
            local_rotation: "weekly".to_string(),
            ..LoggingConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
