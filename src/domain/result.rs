//! Result type alias for Aegis

use super::errors::AegisError;

/// Result type alias for Aegis operations
///
/// # Examples
///
/// ```
/// use aegis::domain::result::Result;
/// use aegis::domain::errors::AegisError;
///
/// fn failing_function() -> Result<()> {
///     Err(AegisError::Configuration("missing section".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, AegisError>;
