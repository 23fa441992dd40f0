//! Unified error types for the domain layer
//!
//! Provides a common error type that can be used across all domain operations,
//! enabling consistent error handling without forcing adapters to use String or anyhow.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Emergency submissions are on cooldown
    #[error("Emergency submissions are blocked until {}", until.to_rfc3339())]
    Blocked { until: DateTime<Utc> },
}

impl DomainError {
    /// Creates a validation error for business rule violations.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a parse error for string-to-type conversion failures.
    ///
    /// Use this in `FromStr` implementations when the input string
    /// doesn't match any known variant or format.
    ///
    /// # Example
    /// ```ignore
    /// impl FromStr for MapType {
    ///     type Err = DomainError;
    ///     fn from_str(s: &str) -> Result<Self, Self::Err> {
    ///         match s {
    ///             "ROAD" => Ok(Self::Road),
    ///             _ => Err(DomainError::parse(format!("Unknown map type: {}", s))),
    ///         }
    ///     }
    /// }
    /// ```
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a cooldown error
    pub fn blocked(until: DateTime<Utc>) -> Self {
        Self::Blocked { until }
    }
}
