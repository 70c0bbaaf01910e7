//! Risk scoring
//!
//! A linear proxy over the number of applied redactions. It is not a
//! calibrated or audited risk model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Points added per applied redaction
pub const POINTS_PER_REDACTION: u8 = 20;

/// Upper bound of the score
pub const MAX_SCORE: u8 = 100;

/// Qualitative risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Clean,
    Low,
    Medium,
    Critical,
}

impl RiskLevel {
    /// Level for a score: `0` clean, `< 40` low, `< 80` medium, otherwise critical
    pub fn from_score(score: u8) -> Self {
        match score {
            0 => Self::Clean,
            1..=39 => Self::Low,
            40..=79 => Self::Medium,
            _ => Self::Critical,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clean => write!(f, "CLEAN"),
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Risk assessment attached to every successful response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Score in `0..=100`
    pub score: u8,
    /// Level derived from the score
    pub level: RiskLevel,
    /// Number of applied redactions
    pub redactions: usize,
}

/// Score a request from its applied redaction count
pub fn score(applied_count: usize) -> RiskAssessment {
    let raw = applied_count.saturating_mul(usize::from(POINTS_PER_REDACTION));
    let score = u8::try_from(raw.min(usize::from(MAX_SCORE))).unwrap_or(MAX_SCORE);

    RiskAssessment {
        score,
        level: RiskLevel::from_score(score),
        redactions: applied_count,
    }
}
