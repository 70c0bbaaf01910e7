//! Replace operator

use super::Operator;
use crate::domain::GovernanceError;

/// Substitutes the whole span with a fixed literal
#[derive(Debug, Clone)]
pub struct ReplaceOperator {
    new_value: String,
}

impl ReplaceOperator {
    /// Create a new replace operator
    pub fn new(new_value: impl Into<String>) -> Self {
        Self {
            new_value: new_value.into(),
        }
    }
}

impl Operator for ReplaceOperator {
    fn operate(&self, _value: &str) -> Result<String, GovernanceError> {
        Ok(self.new_value.clone())
    }
}
