//! Request and response documents of the gateway

use crate::governance::risk::RiskAssessment;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inbound governance request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceRequest {
    /// Caller identity
    pub user_id: String,
    /// Caller department
    pub dept: String,
    /// Prompt destined for the downstream model
    pub prompt: String,
}

impl GovernanceRequest {
    /// Create a request
    pub fn new(
        user_id: impl Into<String>,
        dept: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            dept: dept.into(),
            prompt: prompt.into(),
        }
    }
}

/// Policies reported in `applied_policies`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GovernancePolicy {
    PiiRedaction,
    KeywordFiltering,
}

impl fmt::Display for GovernancePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PiiRedaction => write!(f, "PII_REDACTION"),
            Self::KeywordFiltering => write!(f, "KEYWORD_FILTERING"),
        }
    }
}

/// Per-request governance report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceReport {
    pub original_prompt: String,
    pub sanitized_prompt: String,
    pub applied_policies: Vec<GovernancePolicy>,
}

impl GovernanceReport {
    /// Assemble a report; `PII_REDACTION` is listed only when something was redacted
    pub fn new(original_prompt: String, sanitized_prompt: String, applied_count: usize) -> Self {
        let mut applied_policies = Vec::with_capacity(2);
        if applied_count > 0 {
            applied_policies.push(GovernancePolicy::PiiRedaction);
        }
        applied_policies.push(GovernancePolicy::KeywordFiltering);

        Self {
            original_prompt,
            sanitized_prompt,
            applied_policies,
        }
    }
}

/// What the gateway did to the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayAction {
    Redacted,
    Passed,
}

impl GatewayAction {
    pub fn from_count(applied_count: usize) -> Self {
        if applied_count > 0 {
            Self::Redacted
        } else {
            Self::Passed
        }
    }
}

/// Caller metadata echoed in the response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub dept: String,
    pub user: String,
    pub action: GatewayAction,
}

/// Successful governance response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceResponse {
    /// Always `"success"`
    pub status: String,
    pub risk_assessment: RiskAssessment,
    pub governance_report: GovernanceReport,
    pub metadata: ResponseMetadata,
}

impl GovernanceResponse {
    /// Whether any span was redacted
    pub fn was_redacted(&self) -> bool {
        self.metadata.action == GatewayAction::Redacted
    }
}
