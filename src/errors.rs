//! # Compilation Error Types
//!
//! Every failure of a compilation call is reported through [`CompileError`].
//! Errors are local to the call and deterministic: compiling the same request
//! again yields the same error, so nothing here is ever retried.
//!
//! ## Error Categories
//!
//! - **Configuration**: malformed request input (filter or existence shapes,
//!   missing relationship endpoints, empty label names, bad options)
//! - **Connectivity**: the label/relationship set splits into unrelated
//!   subgraphs and the request did not allow that
//! - **Partitioning invariant**: an internal consistency check of the
//!   optional-match partitioner failed
//!
//! ```ignore
//! CompileError::configuration_with_context(
//!     "unknown check kind 'MAYBE EXISTS'",
//!     "neighbor existence conditions for label 'Subject'",
//! )
//! ```

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CompileError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Disconnected subgraphs found in labels {labels:?}")]
    Connectivity { labels: Vec<String> },

    #[error("Partitioning invariant violated: {0}")]
    PartitioningInvariantViolation(String),
}

/// Helper methods for creating errors with context information
impl CompileError {
    pub fn configuration(message: impl Into<String>) -> Self {
        CompileError::Configuration(message.into())
    }

    /// Create a Configuration error that also says where the input was found
    pub fn configuration_with_context(
        message: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        let msg = message.into();
        let ctx = context.into();
        CompileError::Configuration(format!("{}\n  Context: {}", msg, ctx))
    }

    pub fn connectivity<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CompileError::Connectivity {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, CompileError::Configuration(_))
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(self, CompileError::Connectivity { .. })
    }
}

pub type CompileResult<T> = Result<T, CompileError>;
