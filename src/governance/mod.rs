//! Governance pipeline
//!
//! Leaves first:
//!
//! - [`policy`] - keyword denylist gate
//! - [`detector`] - entity detection capability and its adapter
//! - [`anonymizer`] - overlap resolution and span rewriting
//! - [`operators`] - replace, mask, hash and encrypt operators
//! - [`risk`] - risk scoring
//! - [`orchestrator`] - per-request state machine tying the stages together
//!
//! # Example
//!
//! ```no_run
//! use aegis::config::AegisConfig;
//! use aegis::governance::{GovernanceOrchestrator, GovernanceRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator = GovernanceOrchestrator::from_config(&AegisConfig::default())?;
//! let request = GovernanceRequest::new("u-17", "finance", "My email is jo@corp.io");
//! let response = orchestrator.process(&request).await?;
//! println!("{}", response.governance_report.sanitized_prompt);
//! # Ok(())
//! # }
//! ```

pub mod anonymizer;
pub mod config;
pub mod detector;
pub mod models;
pub mod operators;
pub mod orchestrator;
pub mod policy;
pub mod report;
pub mod risk;

pub use anonymizer::{resolve_conflicts, AnonymizationEngine, ConflictStrategy};
pub use detector::{DetectionAdapter, EntityDetector};
pub use models::{AnonymizationResult, AppliedRedaction, DetectedSpan};
pub use orchestrator::{GovernanceOrchestrator, Lifecycle, PipelineRun, PipelineState};
pub use policy::PolicyGate;
pub use report::{
    GatewayAction, GovernancePolicy, GovernanceReport, GovernanceRequest, GovernanceResponse,
    ResponseMetadata,
};
pub use risk::{RiskAssessment, RiskLevel};
