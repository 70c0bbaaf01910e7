//! Span and anonymization data models

use crate::domain::GovernanceError;
use serde::{Deserialize, Serialize};

/// A detected entity span
///
/// Offsets are UTF-8 byte offsets into the scanned text and always fall on
/// character boundaries. The range is half-open: `[start, end)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedSpan {
    /// Entity type tag (e.g. `EMAIL_ADDRESS`)
    pub entity_type: String,
    /// Inclusive start offset
    pub start: usize,
    /// Exclusive end offset
    pub end: usize,
    /// Detector confidence (0.0 - 1.0)
    pub confidence: f32,
}

impl DetectedSpan {
    /// Create a new span
    pub fn new(entity_type: impl Into<String>, start: usize, end: usize, confidence: f32) -> Self {
        Self {
            entity_type: entity_type.into(),
            start,
            end,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Length of the span in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span covers no text
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether two spans share at least one byte
    pub fn overlaps(&self, other: &DetectedSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Check `0 <= start < end <= len(text)` and that both ends sit on char boundaries
    pub fn validate_against(&self, text: &str) -> Result<(), GovernanceError> {
        let valid = self.start < self.end
            && self.end <= text.len()
            && text.is_char_boundary(self.start)
            && text.is_char_boundary(self.end);

        if valid {
            Ok(())
        } else {
            Err(GovernanceError::InvalidSpan {
                start: self.start,
                end: self.end,
                len: text.len(),
            })
        }
    }
}

/// One span that was rewritten by an operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedRedaction {
    /// Entity type of the rewritten span
    pub entity_type: String,
    /// Operator that rewrote it
    pub operator: String,
    /// Start offset in the original text
    pub start: usize,
    /// End offset in the original text
    pub end: usize,
}

/// Output of the anonymization engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnonymizationResult {
    /// Text with every applied span rewritten
    pub sanitized_text: String,
    /// Number of accepted spans that had a rule and were rewritten
    pub applied_count: usize,
    /// Rewritten spans in ascending offset order
    pub items: Vec<AppliedRedaction>,
}

impl AnonymizationResult {
    /// Result for a text that needed no rewriting
    pub fn unchanged(text: &str) -> Self {
        Self {
            sanitized_text: text.to_string(),
            applied_count: 0,
            items: Vec::new(),
        }
    }

    /// Check if any span was rewritten
    pub fn has_redactions(&self) -> bool {
        self.applied_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_len_and_overlap() {
        let a = DetectedSpan::new("PERSON", 0, 10, 0.9);
        let b = DetectedSpan::new("PERSON", 5, 8, 0.9);
        let c = DetectedSpan::new("PERSON", 10, 12, 0.9);

        assert_eq!(a.len(), 10);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_confidence_is_clamped() {
        let span = DetectedSpan::new("URL", 0, 1, 1.7);
        assert_eq!(span.confidence, 1.0);
    }

    #[test]
    fn test_validate_against_bounds() {
        let text = "hello";
        assert!(DetectedSpan::new("X", 0, 5, 1.0).validate_against(text).is_ok());
        assert!(DetectedSpan::new("X", 0, 6, 1.0).validate_against(text).is_err());
        assert!(DetectedSpan::new("X", 3, 3, 1.0).validate_against(text).is_err());
        assert!(DetectedSpan::new("X", 4, 2, 1.0).validate_against(text).is_err());
    }

    #[test]
    fn test_validate_against_char_boundary() {
        // 'é' is two bytes long
        let text = "café";
        assert!(DetectedSpan::new("X", 0, 5, 1.0).validate_against(text).is_ok());
        assert!(DetectedSpan::new("X", 0, 4, 1.0).validate_against(text).is_err());
    }
}
