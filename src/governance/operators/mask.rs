//! Mask operator

use super::Operator;
use crate::domain::GovernanceError;

/// Overwrites a fixed number of characters with a masking character
///
/// Characters are Unicode scalar values, not bytes. When `chars_to_mask`
/// exceeds the span length the whole span is masked.
#[derive(Debug, Clone)]
pub struct MaskOperator {
    chars_to_mask: usize,
    masking_char: char,
    from_end: bool,
}

impl MaskOperator {
    /// Create a new mask operator, validating its parameters
    ///
    /// `chars_to_mask` must be positive and `masking_char` exactly one character.
    pub fn new(
        entity_type: &str,
        chars_to_mask: i64,
        masking_char: &str,
        from_end: bool,
    ) -> Result<Self, GovernanceError> {
        if chars_to_mask <= 0 {
            return Err(GovernanceError::invalid_operator(
                entity_type,
                format!("chars_to_mask must be positive, got {chars_to_mask}"),
            ));
        }

        let mut chars = masking_char.chars();
        let masking_char = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => {
                return Err(GovernanceError::invalid_operator(
                    entity_type,
                    format!("masking_char must be a single character, got {masking_char:?}"),
                ))
            }
        };

        let chars_to_mask = usize::try_from(chars_to_mask).map_err(|_| {
            GovernanceError::invalid_operator(entity_type, "chars_to_mask is out of range")
        })?;

        Ok(Self {
            chars_to_mask,
            masking_char,
            from_end,
        })
    }
}

impl Operator for MaskOperator {
    fn operate(&self, value: &str) -> Result<String, GovernanceError> {
        let total = value.chars().count();
        let masked = self.chars_to_mask.min(total);
        let (mask_from, mask_to) = if self.from_end {
            (total - masked, total)
        } else {
            (0, masked)
        };

        Ok(value
            .chars()
            .enumerate()
            .map(|(idx, c)| {
                if idx >= mask_from && idx < mask_to {
                    self.masking_char
                } else {
                    c
                }
            })
            .collect())
    }
}
