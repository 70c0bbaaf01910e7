//! Regex-based entity recognizer

use super::{patterns::PatternRegistry, patterns::ENTITY_GROUP, EntityDetector};
use crate::domain::DetectionError;
use crate::governance::models::DetectedSpan;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Default confidence threshold
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Regex-based entity recognizer
///
/// Locale-agnostic: the locale argument is accepted and ignored.
#[derive(Debug, Clone)]
pub struct RegexDetector {
    pattern_registry: Arc<PatternRegistry>,
    confidence_threshold: f32,
}

impl RegexDetector {
    /// Create a new regex detector with the built-in patterns
    pub fn new() -> Result<Self> {
        let registry = PatternRegistry::default_patterns()?;
        Ok(Self::with_registry(registry))
    }

    /// Create a new regex detector with a custom pattern registry
    pub fn with_registry(registry: PatternRegistry) -> Self {
        Self {
            pattern_registry: Arc::new(registry),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }

    /// Set the confidence threshold
    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Scan a string; spans may overlap
    pub fn detect_in_string(&self, text: &str) -> Vec<DetectedSpan> {
        let mut spans = Vec::new();

        for pattern in self.pattern_registry.all_patterns() {
            if pattern.confidence < self.confidence_threshold {
                continue;
            }

            for capture in pattern.regex.captures_iter(text) {
                let matched = capture.name(ENTITY_GROUP).or_else(|| capture.get(0));
                if let Some(m) = matched.filter(|m| !m.is_empty()) {
                    spans.push(DetectedSpan::new(
                        pattern.entity_type.as_str(),
                        m.start(),
                        m.end(),
                        pattern.confidence,
                    ));
                }
            }
        }

        spans.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| b.end.cmp(&a.end)));
        spans
    }
}

#[async_trait]
impl EntityDetector for RegexDetector {
    async fn detect(&self, text: &str, _locale: &str) -> Result<Vec<DetectedSpan>, DetectionError> {
        Ok(self.detect_in_string(text))
    }

    fn name(&self) -> &str {
        "regex"
    }
}
