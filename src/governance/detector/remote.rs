//! Remote entity recognizer
//!
//! Client for a Presidio-analyzer-compatible HTTP service:
//!
//! ```text
//! POST {base_url}/analyze
//! {"text": "...", "language": "en", "score_threshold": 0.5}
//!
//! 200 [{"entity_type": "PERSON", "start": 15, "end": 23, "score": 0.85}, ...]
//! ```
//!
//! The service reports offsets in characters; they are converted to byte
//! offsets before leaving this module.

use super::EntityDetector;
use crate::domain::DetectionError;
use crate::governance::models::DetectedSpan;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    text: &'a str,
    language: &'a str,
    score_threshold: f32,
}

#[derive(Debug, Deserialize)]
struct AnalyzerResult {
    entity_type: String,
    start: usize,
    end: usize,
    score: f32,
}

/// HTTP client for a remote analyzer
#[derive(Debug, Clone)]
pub struct RemoteDetector {
    analyze_url: Url,
    client: Client,
    timeout: Duration,
    score_threshold: f32,
}

impl RemoteDetector {
    /// Create a client for the analyzer at `base_url`
    pub fn new(base_url: &str, timeout: Duration, score_threshold: f32) -> Result<Self, DetectionError> {
        let base = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| DetectionError::Unreachable(format!("invalid analyzer URL: {e}")))?;
        let analyze_url = Url::parse(&format!("{}/analyze", base.as_str().trim_end_matches('/')))
            .map_err(|e| DetectionError::Unreachable(format!("invalid analyzer URL: {e}")))?;

        let client = ClientBuilder::new()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| DetectionError::Unreachable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            analyze_url,
            client,
            timeout,
            score_threshold,
        })
    }

    /// Endpoint the client posts to
    pub fn analyze_url(&self) -> &Url {
        &self.analyze_url
    }
}

/// Map character offsets onto byte offsets of `text`
///
/// Returns `None` when either offset lies past the end of the text.
fn char_span_to_bytes(text: &str, start: usize, end: usize) -> Option<(usize, usize)> {
    if start > end {
        return None;
    }

    let mut boundaries = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()));

    let byte_start = boundaries.nth(start)?;
    let byte_end = if end == start {
        byte_start
    } else {
        boundaries.nth(end - start - 1)?
    };
    Some((byte_start, byte_end))
}

#[async_trait]
impl EntityDetector for RemoteDetector {
    async fn detect(&self, text: &str, locale: &str) -> Result<Vec<DetectedSpan>, DetectionError> {
        let body = AnalyzeRequest {
            text,
            language: locale,
            score_threshold: self.score_threshold,
        };

        let resp = self
            .client
            .post(self.analyze_url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DetectionError::Timeout(self.timeout.as_millis() as u64)
                } else {
                    DetectionError::Unreachable(e.to_string())
                }
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            return Err(DetectionError::Unreachable(format!(
                "analyzer returned status {status}"
            )));
        }

        let results: Vec<AnalyzerResult> = resp
            .json()
            .await
            .map_err(|e| DetectionError::InvalidResponse(e.to_string()))?;

        results
            .into_iter()
            .filter(|r| r.score >= self.score_threshold)
            .map(|r| {
                let (start, end) = char_span_to_bytes(text, r.start, r.end).ok_or_else(|| {
                    DetectionError::InvalidResponse(format!(
                        "span [{}, {}) of type {} lies outside the text",
                        r.start, r.end, r.entity_type
                    ))
                })?;
                Ok(DetectedSpan::new(r.entity_type, start, end, r.score))
            })
            .collect()
    }

    fn name(&self) -> &str {
        "remote"
    }
}
