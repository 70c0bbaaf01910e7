//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "aegis.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Aegis configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your denylist and operators", self.output);
                println!("  2. Put operator keys in .env (AEGIS_HASH_KEY, AEGIS_ENCRYPTION_KEY)");
                println!("  3. Validate configuration: aegis validate-config");
                println!("  4. Try a prompt: aegis check \"My email is jo@corp.io\"");
                println!("  5. Start the gateway: aegis serve");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Aegis Configuration File
# Prompt Governance Gateway

[application]
log_level = "info"

[server]
host = "0.0.0.0"
port = 8000

[policy]
denied_keywords = ["salary", "password", "social security", "secret key", "blueprint"]

[detection]
engine = "regex"

[anonymization.operators.PERSON]
type = "replace"
new_value = "[NAME]"

[anonymization.operators.EMAIL_ADDRESS]
type = "replace"
new_value = "[EMAIL]"

[anonymization.operators.PHONE_NUMBER]
type = "mask"
chars_to_mask = 6
masking_char = "*"
from_end = true

[anonymization.operators.US_SSN]
type = "replace"

[anonymization.operators.CREDIT_CARD]
type = "replace"

[anonymization.operators.IP_ADDRESS]
type = "replace"

[anonymization.operators.URL]
type = "replace"
"#
        .to_string()
    }

    /// Generate configuration with every option documented
    fn generate_config_with_examples() -> String {
        r#"# Aegis Configuration File
# Prompt Governance Gateway
#
# Values of the form ${VAR} are substituted from the environment. Any key can
# also be overridden with AEGIS_<SECTION>_<KEY>, e.g. AEGIS_SERVER_PORT=9000.

[application]
# trace, debug, info, warn, error
log_level = "info"

[server]
host = "0.0.0.0"
port = 8000
# "*" allows any origin
cors_allowed_origins = ["*"]

[policy]
# Matched case-insensitively as substrings; the first match in this order is
# reported back to the caller
denied_keywords = ["salary", "password", "social security", "secret key", "blueprint"]

[detection]
# "regex" (built-in recognizer) or "remote" (Presidio-compatible analyzer)
engine = "regex"
locale = "en"
timeout_ms = 5000
confidence_threshold = 0.5
# Custom pattern library for the regex engine
# pattern_library = "patterns/entity_patterns.toml"

# Required when engine = "remote"
# [detection.remote]
# base_url = "http://localhost:5002"

[anonymization]
# "longest_wins" or "highest_confidence"
conflict_strategy = "longest_wins"
# Key for hash operators
# hash_key = "${AEGIS_HASH_KEY}"
# Base64-encoded 32-byte key for encrypt operators
# encryption_key = "${AEGIS_ENCRYPTION_KEY}"

# One table per entity type. Types without a table pass through untouched,
# so keep a rule for every type the detection engine reports.
# type = "replace" | "mask" | "hash" | "encrypt"

[anonymization.operators.PERSON]
type = "replace"
new_value = "[NAME]"

[anonymization.operators.EMAIL_ADDRESS]
type = "replace"
new_value = "[EMAIL]"

[anonymization.operators.PHONE_NUMBER]
type = "mask"
chars_to_mask = 6
masking_char = "*"
from_end = true

[anonymization.operators.US_SSN]
type = "replace"
# new_value defaults to "<US_SSN>"

[anonymization.operators.CREDIT_CARD]
type = "replace"
# Keyed digest instead of a tag:
# type = "hash"
# hash_type = "sha256"

[anonymization.operators.IP_ADDRESS]
type = "replace"
# Reversible token instead of a tag:
# type = "encrypt"

[anonymization.operators.URL]
type = "replace"

[logging]
local_enabled = false
local_path = "./logs"
# daily, hourly, never
local_rotation = "daily"
"#
        .to_string()
    }
}
