//! Pattern library for the regex recognizer

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Name of the capture group that narrows a match to the entity itself
pub const ENTITY_GROUP: &str = "entity";

/// Pattern definition from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct PatternDefinition {
    /// Entity type tag reported for matches (e.g. `EMAIL_ADDRESS`)
    pub entity_type: String,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
    /// Regex patterns for this entity type
    pub patterns: Vec<String>,
}

/// Compiled pattern with metadata
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// Compiled regex
    pub regex: Regex,
    /// Entity type tag
    pub entity_type: String,
    /// Confidence score
    pub confidence: f32,
}

impl CompiledPattern {
    /// Whether the pattern reports a named `entity` group instead of the whole match
    pub fn has_entity_group(&self) -> bool {
        self.regex.capture_names().flatten().any(|n| n == ENTITY_GROUP)
    }
}

/// Pattern library container
#[derive(Debug, Deserialize)]
struct PatternLibrary {
    patterns: BTreeMap<String, PatternDefinition>,
}

/// Compiled pattern registry
#[derive(Debug)]
pub struct PatternRegistry {
    patterns: Vec<CompiledPattern>,
    patterns_by_entity: HashMap<String, Vec<CompiledPattern>>,
}

impl PatternRegistry {
    /// Create a new pattern registry from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!(
                "Failed to read pattern library: {}",
                path.as_ref().display()
            )
        })?;

        Self::from_toml(&content)
    }

    /// Create a pattern registry from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let library: PatternLibrary =
            toml::from_str(content).context("Failed to parse pattern library TOML")?;

        let mut patterns = Vec::new();
        let mut patterns_by_entity: HashMap<String, Vec<CompiledPattern>> = HashMap::new();

        for (name, def) in library.patterns {
            Self::validate_entity_type(&def.entity_type).with_context(|| {
                format!("Invalid entity type in pattern '{}': {}", name, def.entity_type)
            })?;

            if !(0.0..=1.0).contains(&def.confidence) {
                anyhow::bail!(
                    "Confidence of pattern '{name}' must be within 0.0..=1.0, got {}",
                    def.confidence
                );
            }

            for pattern_str in &def.patterns {
                let regex = Regex::new(pattern_str)
                    .with_context(|| format!("Invalid regex in pattern '{name}': {pattern_str}"))?;

                let compiled = CompiledPattern {
                    regex,
                    entity_type: def.entity_type.clone(),
                    confidence: def.confidence,
                };

                patterns.push(compiled.clone());
                patterns_by_entity
                    .entry(def.entity_type.clone())
                    .or_default()
                    .push(compiled);
            }
        }

        Ok(Self {
            patterns,
            patterns_by_entity,
        })
    }

    /// Create a default pattern registry with built-in patterns
    pub fn default_patterns() -> Result<Self> {
        let default_toml = include_str!("../../../patterns/entity_patterns.toml");
        Self::from_toml(default_toml)
    }

    /// Get all patterns
    pub fn all_patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    /// Get patterns for a specific entity type
    pub fn patterns_for_entity(&self, entity_type: &str) -> Option<&[CompiledPattern]> {
        self.patterns_by_entity
            .get(entity_type)
            .map(|v| v.as_slice())
    }

    /// Entity types with at least one pattern, sorted
    pub fn entity_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.patterns_by_entity.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// Entity types are upper snake case tags such as `US_SSN`
    fn validate_entity_type(s: &str) -> Result<()> {
        let valid = !s.is_empty()
            && s
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');
        if !valid {
            anyhow::bail!("Entity type must be upper snake case: {s}");
        }
        Ok(())
    }
}
