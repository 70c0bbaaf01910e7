// Aegis - Prompt Governance Gateway
// Copyright (c) 2025 Aegis Contributors
// Licensed under the MIT License

//! # Aegis - Prompt Governance Gateway
//!
//! Aegis inspects prompts on their way to a language model. It blocks prompts
//! that contain denied terms, rewrites sensitive entities (names, emails, phone
//! numbers and so on) and attaches a risk assessment to every request.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`governance`] - Policy gate, entity detection, anonymization, risk scoring
//!   and the per-request orchestrator
//! - [`server`] - HTTP gateway
//! - [`domain`] - Error taxonomy
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use aegis::config::load_config;
//! use aegis::governance::{GovernanceOrchestrator, GovernanceRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("aegis.toml")?;
//!     let orchestrator = GovernanceOrchestrator::from_config(&config)?;
//!
//!     let request = GovernanceRequest::new(
//!         "u-17",
//!         "support",
//!         "Hi, my name is John Doe. My email is john.doe@example.com",
//!     );
//!     let response = orchestrator.process(&request).await?;
//!
//!     println!("{}", response.governance_report.sanitized_prompt);
//!     println!("risk: {}", response.risk_assessment.level);
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! Each request moves through `Received → Validated → Detected → Anonymized →
//! Scored → Completed`. A denylist hit ends the request in `Rejected` before
//! detection runs; any other failure ends it in `Failed`. No partial report is
//! ever returned and the original prompt is never echoed on a failure path.
//!
//! ## Error Handling
//!
//! Startup and I/O paths use [`domain::AegisError`]; the pipeline itself
//! returns [`domain::GovernanceError`]:
//!
//! ```rust
//! use aegis::governance::PolicyGate;
//! use aegis::domain::GovernanceError;
//!
//! let gate = PolicyGate::default();
//! match gate.check("what is the CEO salary?") {
//!     Err(GovernanceError::PolicyViolation { term }) => assert_eq!(term, "salary"),
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod governance;
pub mod logging;
pub mod server;
