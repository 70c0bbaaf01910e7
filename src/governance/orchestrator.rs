//! Governance orchestrator
//!
//! Runs one request through the pipeline as a strictly sequential state
//! machine:
//!
//! ```text
//! Received → Validated → Detected → Anonymized → Scored → Completed
//!     └──────────┴──────────┴───────────┴──────────┴──→ Rejected | Failed
//! ```
//!
//! A policy violation ends in `Rejected`, any other error in `Failed`. No
//! state is re-entered and nothing is retried. The orchestrator holds only
//! read-only shared state, so one instance serves every request.

use crate::config::AegisConfig;
use crate::domain::{AegisError, GovernanceError};
use crate::governance::anonymizer::AnonymizationEngine;
use crate::governance::detector::DetectionAdapter;
use crate::governance::models::AnonymizationResult;
use crate::governance::policy::PolicyGate;
use crate::governance::report::{
    GatewayAction, GovernanceReport, GovernanceRequest, GovernanceResponse, ResponseMetadata,
};
use crate::governance::risk::{self, RiskAssessment};
use crate::{log_governance_complete, log_pipeline_transition, log_policy_violation};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// Pipeline state of one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineState {
    Received,
    Validated,
    Detected,
    Anonymized,
    Scored,
    Completed,
    Rejected,
    Failed,
}

impl PipelineState {
    /// The only forward successor, or `None` for terminal states
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Received => Some(Self::Validated),
            Self::Validated => Some(Self::Detected),
            Self::Detected => Some(Self::Anonymized),
            Self::Anonymized => Some(Self::Scored),
            Self::Scored => Some(Self::Completed),
            Self::Completed | Self::Rejected | Self::Failed => None,
        }
    }

    /// Whether no further transition is possible
    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Received => "received",
            Self::Validated => "validated",
            Self::Detected => "detected",
            Self::Anonymized => "anonymized",
            Self::Scored => "scored",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// State history of one request
#[derive(Debug, Clone)]
pub struct Lifecycle {
    history: Vec<PipelineState>,
}

impl Lifecycle {
    fn new() -> Self {
        Self {
            history: vec![PipelineState::Received],
        }
    }

    /// Current state
    pub fn state(&self) -> PipelineState {
        self.history
            .last()
            .copied()
            .unwrap_or(PipelineState::Received)
    }

    /// Every state visited, in order
    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    /// Move to `to`, which must be the forward successor of the current state
    pub fn advance(&mut self, to: PipelineState) -> Result<(), GovernanceError> {
        let from = self.state();
        if from.next() != Some(to) {
            return Err(GovernanceError::InvalidTransition {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        log_pipeline_transition!(from, to);
        self.history.push(to);
        Ok(())
    }

    /// Move to `Rejected` or `Failed` depending on the error
    fn terminate(&mut self, error: &GovernanceError) {
        let from = self.state();
        if from.is_terminal() {
            return;
        }
        let to = if error.is_policy_violation() {
            PipelineState::Rejected
        } else {
            PipelineState::Failed
        };
        log_pipeline_transition!(from, to);
        self.history.push(to);
    }
}

/// Outcome of one pipeline execution with its state history
#[derive(Debug)]
pub struct PipelineRun {
    pub lifecycle: Lifecycle,
    pub result: Result<GovernanceResponse, GovernanceError>,
}

impl PipelineRun {
    /// Terminal state reached
    pub fn final_state(&self) -> PipelineState {
        self.lifecycle.state()
    }
}

/// Sequences policy gate, detection, anonymization and scoring
#[derive(Debug, Clone)]
pub struct GovernanceOrchestrator {
    gate: PolicyGate,
    detection: DetectionAdapter,
    anonymizer: AnonymizationEngine,
}

impl GovernanceOrchestrator {
    /// Assemble an orchestrator from its stages
    pub fn new(gate: PolicyGate, detection: DetectionAdapter, anonymizer: AnonymizationEngine) -> Self {
        Self {
            gate,
            detection,
            anonymizer,
        }
    }

    /// Build every stage from configuration
    ///
    /// # Errors
    ///
    /// Fails with [`GovernanceError::InvalidOperatorConfig`] (wrapped in
    /// [`AegisError::Governance`]) for a malformed operator rule, or
    /// [`AegisError::Configuration`] when the detection engine cannot be built.
    pub fn from_config(config: &AegisConfig) -> Result<Self, AegisError> {
        let gate = PolicyGate::from_config(&config.policy);
        let detection = DetectionAdapter::from_config(&config.detection)?;
        let table = config.anonymization.operator_table()?;

        tracing::info!(
            denied_keywords = gate.terms().len(),
            engine = detection.engine_name(),
            operators = ?table.entity_types(),
            conflict_strategy = %config.anonymization.conflict_strategy,
            "Governance pipeline ready"
        );

        let anonymizer =
            AnonymizationEngine::new(Arc::new(table), config.anonymization.conflict_strategy);
        Ok(Self::new(gate, detection, anonymizer))
    }

    /// Name of the detection engine
    pub fn engine_name(&self) -> &str {
        self.detection.engine_name()
    }

    /// Run a request and return the response
    pub async fn process(
        &self,
        request: &GovernanceRequest,
    ) -> Result<GovernanceResponse, GovernanceError> {
        self.run(request).await.result
    }

    /// Run a request, keeping the state history
    pub async fn run(&self, request: &GovernanceRequest) -> PipelineRun {
        let span = tracing::info_span!(
            "governance",
            request_id = %Uuid::new_v4(),
            user = %request.user_id,
            dept = %request.dept
        );

        async {
            let started = Instant::now();
            let mut lifecycle = Lifecycle::new();

            let result = self.execute(request, &mut lifecycle).await;
            match &result {
                Ok(response) => {
                    let assessment = &response.risk_assessment;
                    log_governance_complete!(
                        assessment.redactions,
                        assessment.score,
                        assessment.level,
                        started.elapsed()
                    );
                }
                Err(e) => {
                    lifecycle.terminate(e);
                    match e {
                        GovernanceError::PolicyViolation { term } => {
                            log_policy_violation!(term);
                        }
                        other => {
                            tracing::error!(error = %other, "Governance failed");
                        }
                    }
                }
            }

            PipelineRun { lifecycle, result }
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        request: &GovernanceRequest,
        lifecycle: &mut Lifecycle,
    ) -> Result<GovernanceResponse, GovernanceError> {
        let prompt = request.prompt.as_str();

        self.gate.check(prompt)?;
        lifecycle.advance(PipelineState::Validated)?;

        let spans = self.detection.detect(prompt).await?;
        tracing::debug!(spans = spans.len(), "Entities detected");
        lifecycle.advance(PipelineState::Detected)?;

        let anonymized: AnonymizationResult = self.anonymizer.anonymize(prompt, &spans)?;
        tracing::debug!(
            applied = anonymized.applied_count,
            entity_types = ?anonymized
                .items
                .iter()
                .map(|i| i.entity_type.as_str())
                .collect::<Vec<_>>(),
            "Prompt anonymized"
        );
        lifecycle.advance(PipelineState::Anonymized)?;

        let assessment: RiskAssessment = risk::score(anonymized.applied_count);
        lifecycle.advance(PipelineState::Scored)?;

        let response = GovernanceResponse {
            status: "success".to_string(),
            risk_assessment: assessment,
            governance_report: GovernanceReport::new(
                request.prompt.clone(),
                anonymized.sanitized_text,
                anonymized.applied_count,
            ),
            metadata: ResponseMetadata {
                dept: request.dept.clone(),
                user: request.user_id.clone(),
                action: GatewayAction::from_count(anonymized.applied_count),
            },
        };
        lifecycle.advance(PipelineState::Completed)?;

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::governance::anonymizer::ConflictStrategy;
    use crate::governance::detector::EntityDetector;
    use crate::governance::models::DetectedSpan;
    use crate::domain::DetectionError;
    use crate::governance::operators::{OperatorConfig, OperatorTable};
    use async_trait::async_trait;
    use std::time::Duration;

    struct StaticDetector(Vec<DetectedSpan>);

    #[async_trait]
    impl EntityDetector for StaticDetector {
        async fn detect(&self, _text: &str, _locale: &str) -> Result<Vec<DetectedSpan>, DetectionError> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "static"
        }
    }

    fn orchestrator(spans: Vec<DetectedSpan>) -> GovernanceOrchestrator {
        let table = OperatorTable::from_rules([(
            "EMAIL_ADDRESS",
            OperatorConfig::replace("[EMAIL]"),
        )])
        .unwrap();
        GovernanceOrchestrator::new(
            PolicyGate::default(),
            DetectionAdapter::new(Arc::new(StaticDetector(spans)), "en", Duration::from_secs(1)),
            AnonymizationEngine::new(Arc::new(table), ConflictStrategy::LongestWins),
        )
    }

    #[test]
    fn test_state_successors() {
        assert_eq!(PipelineState::Received.next(), Some(PipelineState::Validated));
        assert_eq!(PipelineState::Scored.next(), Some(PipelineState::Completed));
        assert!(PipelineState::Completed.is_terminal());
        assert!(PipelineState::Rejected.is_terminal());
        assert!(PipelineState::Failed.is_terminal());
    }

    #[test]
    fn test_lifecycle_rejects_skips_and_reentry() {
        let mut lifecycle = Lifecycle::new();
        assert!(lifecycle.advance(PipelineState::Detected).is_err());
        assert!(lifecycle.advance(PipelineState::Received).is_err());
        lifecycle.advance(PipelineState::Validated).unwrap();
        assert!(lifecycle.advance(PipelineState::Validated).is_err());
        assert_eq!(
            lifecycle.history(),
            &[PipelineState::Received, PipelineState::Validated]
        );
    }

    #[tokio::test]
    async fn test_completed_run_history() {
        let prompt = "My email is john.doe@example.com";
        let orch = orchestrator(vec![DetectedSpan::new("EMAIL_ADDRESS", 12, 32, 1.0)]);
        let run = orch.run(&GovernanceRequest::new("u1", "eng", prompt)).await;

        assert_eq!(run.final_state(), PipelineState::Completed);
        assert_eq!(
            run.lifecycle.history(),
            &[
                PipelineState::Received,
                PipelineState::Validated,
                PipelineState::Detected,
                PipelineState::Anonymized,
                PipelineState::Scored,
                PipelineState::Completed,
            ]
        );

        let response = run.result.unwrap();
        assert_eq!(response.governance_report.sanitized_prompt, "My email is [EMAIL]");
        assert_eq!(response.governance_report.original_prompt, prompt);
        assert!(response.was_redacted());
    }

    #[tokio::test]
    async fn test_violation_is_rejected() {
        let orch = orchestrator(vec![]);
        let run = orch
            .run(&GovernanceRequest::new("u1", "eng", "What is the CEO SALARY?"))
            .await;

        assert_eq!(run.final_state(), PipelineState::Rejected);
        assert!(matches!(
            run.result,
            Err(GovernanceError::PolicyViolation { ref term }) if term == "salary"
        ));
    }

    #[tokio::test]
    async fn test_bad_span_fails() {
        let orch = orchestrator(vec![DetectedSpan::new("EMAIL_ADDRESS", 0, 99, 1.0)]);
        let run = orch.run(&GovernanceRequest::new("u1", "eng", "tiny")).await;

        assert_eq!(run.final_state(), PipelineState::Failed);
        assert_eq!(
            run.lifecycle.history(),
            &[PipelineState::Received, PipelineState::Validated, PipelineState::Failed]
        );
    }
}
