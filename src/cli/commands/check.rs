//! Check command implementation
//!
//! Runs a single prompt through the governance pipeline and prints the
//! response document as JSON.

use crate::config::load_config;
use crate::domain::GovernanceError;
use crate::governance::{GovernanceOrchestrator, GovernanceRequest};
use clap::Args;
use serde_json::json;
use tokio::io::AsyncReadExt;

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Prompt to check (read from stdin when omitted)
    pub prompt: Option<String>,

    /// User id recorded in the response metadata
    #[arg(long, default_value = "cli")]
    pub user: String,

    /// Department recorded in the response metadata
    #[arg(long, default_value = "cli")]
    pub dept: String,
}

impl CheckArgs {
    /// Execute the check command
    ///
    /// Exit codes: 0 processed, 1 rejected by policy, 2 configuration error,
    /// 5 internal failure.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        let orchestrator = match GovernanceOrchestrator::from_config(&config) {
            Ok(o) => o,
            Err(e) => {
                eprintln!("❌ Governance pipeline could not be built: {e}");
                return Ok(2);
            }
        };

        let prompt = match &self.prompt {
            Some(p) => p.clone(),
            None => {
                let mut buf = String::new();
                tokio::io::stdin().read_to_string(&mut buf).await?;
                buf.trim_end_matches(['\r', '\n']).to_string()
            }
        };

        let request = GovernanceRequest::new(self.user.as_str(), self.dept.as_str(), prompt);
        Self::report(orchestrator.process(&request).await)
    }

    fn report(
        result: Result<crate::governance::GovernanceResponse, GovernanceError>,
    ) -> anyhow::Result<i32> {
        match result {
            Ok(response) => {
                println!("{}", serde_json::to_string_pretty(&response)?);
                Ok(0)
            }
            Err(GovernanceError::PolicyViolation { term }) => {
                let body = json!({
                    "error": {
                        "code": "POLICY_VIOLATION",
                        "message": format!("Security Violation: Restricted content found ('{term}')"),
                        "term": term,
                    }
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
                Ok(1)
            }
            Err(e) => {
                tracing::error!(error = %e, "Governance failed");
                let body = json!({
                    "error": {
                        "code": "INTERNAL_GOVERNANCE_ERROR",
                        "message": "Internal Governance Error",
                    }
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
                Ok(5)
            }
        }
    }
}
