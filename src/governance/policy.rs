//! Keyword denylist gate
//!
//! The gate runs before anything else in the pipeline. A match rejects the
//! whole request; detection and anonymization never see the prompt.

use crate::config::PolicyConfig;
use crate::domain::GovernanceError;

/// Terms denied by default
pub const DEFAULT_DENIED_KEYWORDS: &[&str] = &[
    "salary",
    "password",
    "social security",
    "secret key",
    "blueprint",
];

/// Case-insensitive substring denylist
#[derive(Debug, Clone)]
pub struct PolicyGate {
    /// Terms as configured, in iteration order
    terms: Vec<String>,
    /// Lowercased terms, index-aligned with `terms`
    lowered: Vec<String>,
}

impl PolicyGate {
    /// Create a gate from an ordered list of terms
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let terms: Vec<String> = terms.into_iter().map(Into::into).collect();
        let lowered = terms.iter().map(|t| t.to_lowercase()).collect();
        Self { terms, lowered }
    }

    /// Create a gate from the `[policy]` configuration section
    pub fn from_config(config: &PolicyConfig) -> Self {
        Self::new(config.denied_keywords.iter().cloned())
    }

    /// Check a prompt against the denylist
    ///
    /// Returns the first matching term in denylist order.
    pub fn check(&self, text: &str) -> Result<(), GovernanceError> {
        let text_lower = text.to_lowercase();

        match self
            .lowered
            .iter()
            .position(|term| text_lower.contains(term.as_str()))
        {
            Some(idx) => Err(GovernanceError::PolicyViolation {
                term: self.terms[idx].clone(),
            }),
            None => Ok(()),
        }
    }

    /// Configured terms in iteration order
    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

impl Default for PolicyGate {
    fn default() -> Self {
        Self::new(DEFAULT_DENIED_KEYWORDS.iter().copied())
    }
}
