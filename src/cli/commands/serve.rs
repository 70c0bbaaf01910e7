//! Serve command implementation
//!
//! Runs the HTTP gateway until SIGINT or SIGTERM.

use crate::config::load_config;
use crate::governance::GovernanceOrchestrator;
use crate::server;
use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the serve command
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Override the configured bind host
    #[arg(long)]
    pub host: Option<String>,

    /// Override the configured bind port
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Starting gateway");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("❌ Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        if let Some(ref host) = self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }

        // A malformed operator rule must stop the service before it accepts traffic
        let orchestrator = match GovernanceOrchestrator::from_config(&config) {
            Ok(o) => Arc::new(o),
            Err(e) => {
                tracing::error!(error = %e, "Refusing to start");
                eprintln!("❌ Refusing to start: {e}");
                return Ok(2);
            }
        };

        println!(
            "🛡️  Aegis listening on {}:{} (engine: {})",
            config.server.host,
            config.server.port,
            orchestrator.engine_name()
        );

        server::serve(&config.server, orchestrator, shutdown_signal).await?;

        println!("✅ Gateway stopped");
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_invalid_operator_refuses_to_start() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[anonymization.operators.PHONE_NUMBER]\ntype = \"mask\"\nchars_to_mask = -1\n")
            .unwrap();
        file.flush().unwrap();

        let (_tx, rx) = watch::channel(false);
        let code = ServeArgs::default()
            .execute(&file.path().to_string_lossy(), rx)
            .await
            .unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_stops_on_shutdown_signal() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[server]\nhost = \"127.0.0.1\"\nport = 0\n")
            .unwrap();
        file.flush().unwrap();

        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();
        let code = ServeArgs::default()
            .execute(&file.path().to_string_lossy(), rx)
            .await
            .unwrap();
        assert_eq!(code, 0);
    }
}
