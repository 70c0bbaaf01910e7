//! Domain types for Aegis.
//!
//! The domain layer holds the error taxonomy shared by every other layer and the
//! [`Result`] alias used for fallible startup and I/O operations.
//!
//! # Error Handling
//!
//! ```rust
//! use aegis::domain::{AegisError, GovernanceError};
//!
//! let err: AegisError = GovernanceError::PolicyViolation { term: "salary".into() }.into();
//! assert!(!err.is_configuration());
//! ```

pub mod errors;
pub mod result;

pub use errors::{AegisError, DetectionError, GovernanceError};
pub use result::Result;
