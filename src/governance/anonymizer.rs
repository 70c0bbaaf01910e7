//! Anonymization engine
//!
//! Resolves overlapping spans, then rewrites the accepted ones with the
//! operator configured for their entity type.
//!
//! # Examples
//!
//! ```
//! use aegis::governance::anonymizer::{AnonymizationEngine, ConflictStrategy};
//! use aegis::governance::models::DetectedSpan;
//! use aegis::governance::operators::{OperatorConfig, OperatorTable};
//! use std::sync::Arc;
//!
//! let table = OperatorTable::from_rules([("EMAIL_ADDRESS", OperatorConfig::replace("[EMAIL]"))]).unwrap();
//! let engine = AnonymizationEngine::new(Arc::new(table), ConflictStrategy::LongestWins);
//!
//! let text = "My email is john.doe@example.com";
//! let spans = vec![DetectedSpan::new("EMAIL_ADDRESS", 12, 32, 1.0)];
//! let result = engine.anonymize(text, &spans).unwrap();
//!
//! assert_eq!(result.sanitized_text, "My email is [EMAIL]");
//! assert_eq!(result.applied_count, 1);
//! ```

use crate::domain::GovernanceError;
use crate::governance::models::{AnonymizationResult, AppliedRedaction, DetectedSpan};
use crate::governance::operators::OperatorTable;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// How overlapping spans are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictStrategy {
    /// Greedy leftmost selection; the longer span wins at equal starts
    #[default]
    LongestWins,
    /// Greedy selection in descending confidence order
    HighestConfidence,
}

impl fmt::Display for ConflictStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LongestWins => write!(f, "longest_wins"),
            Self::HighestConfidence => write!(f, "highest_confidence"),
        }
    }
}

/// `(start asc, length desc)`
fn by_position(a: &DetectedSpan, b: &DetectedSpan) -> Ordering {
    a.start.cmp(&b.start).then_with(|| b.len().cmp(&a.len()))
}

/// Select a non-overlapping subset of `spans`
///
/// The returned spans are sorted by start offset. Dropped spans are never
/// applied and never reported.
pub fn resolve_conflicts(spans: &[DetectedSpan], strategy: ConflictStrategy) -> Vec<DetectedSpan> {
    let mut candidates: Vec<&DetectedSpan> = spans.iter().collect();

    match strategy {
        ConflictStrategy::LongestWins => {
            candidates.sort_by(|a, b| by_position(a, b));

            let mut accepted: Vec<DetectedSpan> = Vec::with_capacity(candidates.len());
            let mut last_end = 0usize;
            for span in candidates {
                if span.start >= last_end {
                    last_end = span.end;
                    accepted.push(span.clone());
                }
            }
            accepted
        }
        ConflictStrategy::HighestConfidence => {
            candidates.sort_by(|a, b| {
                b.confidence
                    .total_cmp(&a.confidence)
                    .then_with(|| by_position(a, b))
            });

            let mut accepted: Vec<DetectedSpan> = Vec::with_capacity(candidates.len());
            for span in candidates {
                if !accepted.iter().any(|kept| kept.overlaps(span)) {
                    accepted.push(span.clone());
                }
            }
            accepted.sort_by(by_position);
            accepted
        }
    }
}

/// Rewrites detected spans according to the operator table
///
/// Cloning is cheap; the operator table is shared behind an `Arc` and never
/// mutated after construction.
#[derive(Debug, Clone)]
pub struct AnonymizationEngine {
    rules: Arc<OperatorTable>,
    strategy: ConflictStrategy,
}

impl AnonymizationEngine {
    /// Create an engine over an operator table
    pub fn new(rules: Arc<OperatorTable>, strategy: ConflictStrategy) -> Self {
        Self { rules, strategy }
    }

    /// The operator table in use
    pub fn rules(&self) -> &OperatorTable {
        &self.rules
    }

    /// The conflict resolution strategy in use
    pub fn strategy(&self) -> ConflictStrategy {
        self.strategy
    }

    /// Anonymize `text` given the spans detected in it
    ///
    /// Spans must satisfy `0 <= start < end <= text.len()` and sit on char
    /// boundaries. Spans whose entity type has no rule pass through untouched
    /// and are not counted.
    ///
    /// # Errors
    ///
    /// Returns [`GovernanceError::InvalidSpan`] for an out-of-range span and
    /// [`GovernanceError::Operator`] if an operator fails.
    pub fn anonymize(
        &self,
        text: &str,
        spans: &[DetectedSpan],
    ) -> Result<AnonymizationResult, GovernanceError> {
        for span in spans {
            span.validate_against(text)?;
        }

        let accepted = resolve_conflicts(spans, self.strategy);
        if accepted.len() < spans.len() {
            tracing::debug!(
                detected = spans.len(),
                accepted = accepted.len(),
                strategy = %self.strategy,
                "Dropped overlapping spans"
            );
        }

        let mut sanitized = text.to_string();
        let mut items = Vec::new();

        // Back to front so earlier offsets stay valid
        for span in accepted.iter().rev() {
            let Some(rule) = self.rules.get(&span.entity_type) else {
                continue;
            };

            let replacement = rule.apply(&text[span.start..span.end])?;
            sanitized.replace_range(span.start..span.end, &replacement);
            items.push(AppliedRedaction {
                entity_type: span.entity_type.clone(),
                operator: rule.action().to_string(),
                start: span.start,
                end: span.end,
            });
        }

        items.reverse();

        Ok(AnonymizationResult {
            sanitized_text: sanitized,
            applied_count: items.len(),
            items,
        })
    }
}
