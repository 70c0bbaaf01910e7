//! Configuration management for Aegis.
//!
//! # Overview
//!
//! Aegis uses a TOML configuration file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `AEGIS_<SECTION>_<KEY>` environment overrides
//! - Defaults for every setting (an empty file is valid)
//! - Validation on load, including every anonymization operator rule
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use aegis::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("aegis.toml")?;
//! println!("Listening on {}:{}", config.server.host, config.server.port);
//! println!("Detection engine: {}", config.detection.engine);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`ServerConfig`] - Bind address and CORS origins
//! - [`PolicyConfig`] - Keyword denylist
//! - [`DetectionConfig`] - Detection engine selection and tuning
//! - [`AnonymizationConfig`] - Operator rules and operator keys
//! - [`LoggingConfig`] - Rolling JSON log files
//!
//! # Example Configuration
//!
//! ```toml
//! [policy]
//! denied_keywords = ["salary", "password"]
//!
//! [detection]
//! engine = "remote"
//! remote = { base_url = "http://localhost:5002" }
//!
//! [anonymization]
//! hash_key = "${AEGIS_HASH_KEY}"
//!
//! [anonymization.operators.US_SSN]
//! type = "hash"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use crate::governance::config::{
    AnonymizationConfig, DetectionConfig, DetectionEngineKind, PolicyConfig,
    RemoteDetectionConfig,
};
pub use loader::{load_config, load_config_from_str};
pub use schema::{AegisConfig, ApplicationConfig, LoggingConfig, ServerConfig};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
