//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Aegis configuration file, including every anonymization operator.

use crate::config::{load_config, DetectionEngineKind};
use crate::governance::GovernanceOrchestrator;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading validates every section
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        // Build the pipeline so pattern libraries and operator keys are exercised too
        if let Err(e) = GovernanceOrchestrator::from_config(&config) {
            println!("❌ Governance pipeline could not be built");
            println!("   Error: {e}");
            println!();
            return Ok(2);
        }

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Listen Address: {}:{}", config.server.host, config.server.port);
        println!("  Denied Keywords: {}", config.policy.denied_keywords.len());
        println!("  Detection Engine: {}", config.detection.engine);
        if config.detection.engine == DetectionEngineKind::Remote {
            if let Some(ref remote) = config.detection.remote {
                println!("  Analyzer URL: {}", remote.base_url);
            }
        }
        println!("  Locale: {}", config.detection.locale);
        println!(
            "  Conflict Strategy: {}",
            config.anonymization.conflict_strategy
        );
        println!("  Operators:");
        for (entity_type, operator) in &config.anonymization.operators {
            println!("    {entity_type} → {}", operator.action());
        }
        println!();
        Ok(0)
    }
}
