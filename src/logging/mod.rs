//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output with configurable log levels
//! - JSON-formatted rolling log files
//!
//! Prompt text and raw span values are never logged. Pipeline events carry
//! counts, entity types and request ids only.
//!
//! # Example
//!
//! ```no_run
//! use aegis::logging::init_logging;
//! use aegis::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Gateway started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log a pipeline state transition
///
/// # Example
///
/// ```no_run
/// use aegis::log_pipeline_transition;
/// use aegis::governance::PipelineState;
///
/// log_pipeline_transition!(PipelineState::Received, PipelineState::Validated);
/// ```
#[macro_export]
macro_rules! log_pipeline_transition {
    ($from:expr, $to:expr) => {
        tracing::debug!(
            from = %$from,
            to = %$to,
            "Pipeline transition"
        );
    };
}

/// Log a denylist rejection
///
/// # Example
///
/// ```no_run
/// use aegis::log_policy_violation;
///
/// log_policy_violation!("salary");
/// ```
#[macro_export]
macro_rules! log_policy_violation {
    ($term:expr) => {
        tracing::warn!(
            term = %$term,
            "Request rejected by keyword policy"
        );
    };
}

/// Log the completion of a governance request
///
/// # Example
///
/// ```no_run
/// use aegis::log_governance_complete;
/// use std::time::Duration;
///
/// log_governance_complete!(3, 60, "MEDIUM", Duration::from_millis(4));
/// ```
#[macro_export]
macro_rules! log_governance_complete {
    ($redactions:expr, $score:expr, $level:expr, $duration:expr) => {
        tracing::info!(
            redactions = $redactions,
            score = $score,
            level = %$level,
            duration_ms = $duration.as_millis(),
            "Governance completed"
        );
    };
}
