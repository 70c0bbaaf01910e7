//! Entity detection
//!
//! [`EntityDetector`] is the capability interface to whatever recognizer a
//! deployment runs. [`DetectionAdapter`] wraps one detector, bounds each call
//! with a timeout and checks that every returned span is well formed. It does
//! not filter by entity type; that is the anonymization engine's job.

pub mod patterns;
pub mod regex;
pub mod remote;

use crate::domain::{AegisError, DetectionError, GovernanceError};
use crate::governance::config::{DetectionConfig, DetectionEngineKind};
use crate::governance::models::DetectedSpan;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub use self::regex::RegexDetector;
pub use patterns::PatternRegistry;
pub use remote::RemoteDetector;

/// Trait for entity recognizers
///
/// Implementations are shared across concurrent requests and must be safe to
/// call from many tasks at once.
#[async_trait]
pub trait EntityDetector: Send + Sync {
    /// Detect entity spans in `text`
    async fn detect(&self, text: &str, locale: &str) -> Result<Vec<DetectedSpan>, DetectionError>;

    /// Engine name reported by the health endpoint
    fn name(&self) -> &str;
}

/// Normalizing wrapper around an [`EntityDetector`]
#[derive(Clone)]
pub struct DetectionAdapter {
    detector: Arc<dyn EntityDetector>,
    locale: String,
    timeout: Duration,
}

impl DetectionAdapter {
    /// Wrap a detector
    pub fn new(detector: Arc<dyn EntityDetector>, locale: impl Into<String>, timeout: Duration) -> Self {
        Self {
            detector,
            locale: locale.into(),
            timeout,
        }
    }

    /// Build the detector selected by the `[detection]` configuration section
    pub fn from_config(config: &DetectionConfig) -> Result<Self, AegisError> {
        let timeout = Duration::from_millis(config.timeout_ms);

        let detector: Arc<dyn EntityDetector> = match config.engine {
            DetectionEngineKind::Regex => {
                let registry = match &config.pattern_library {
                    Some(path) => PatternRegistry::from_file(path),
                    None => PatternRegistry::default_patterns(),
                }
                .map_err(|e| AegisError::Configuration(format!("{e:#}")))?;

                Arc::new(
                    RegexDetector::with_registry(registry)
                        .with_confidence_threshold(config.confidence_threshold),
                )
            }
            DetectionEngineKind::Remote => {
                let remote = config.remote.as_ref().ok_or_else(|| {
                    AegisError::Configuration(
                        "detection.remote is required when detection.engine = 'remote'"
                            .to_string(),
                    )
                })?;
                Arc::new(RemoteDetector::new(
                    &remote.base_url,
                    timeout,
                    config.confidence_threshold,
                )?)
            }
        };

        tracing::debug!(
            engine = detector.name(),
            locale = %config.locale,
            timeout_ms = config.timeout_ms,
            "Detection engine initialized"
        );

        Ok(Self::new(detector, config.locale.clone(), timeout))
    }

    /// Name of the wrapped engine
    pub fn engine_name(&self) -> &str {
        self.detector.name()
    }

    /// Locale passed to the engine
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Detect spans in `text`
    ///
    /// # Errors
    ///
    /// Returns [`GovernanceError::DetectionUnavailable`] when the engine fails
    /// or exceeds the timeout, and [`GovernanceError::InvalidSpan`] when the
    /// engine reports a span outside the text.
    pub async fn detect(&self, text: &str) -> Result<Vec<DetectedSpan>, GovernanceError> {
        let spans = tokio::time::timeout(self.timeout, self.detector.detect(text, &self.locale))
            .await
            .map_err(|_| DetectionError::Timeout(self.timeout.as_millis() as u64))??;

        for span in &spans {
            span.validate_against(text)?;
        }

        Ok(spans)
    }
}

impl std::fmt::Debug for DetectionAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectionAdapter")
            .field("engine", &self.detector.name())
            .field("locale", &self.locale)
            .field("timeout", &self.timeout)
            .finish()
    }
}
