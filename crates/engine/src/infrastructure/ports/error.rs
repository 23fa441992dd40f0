//! Error types for port operations.

/// Repository operation errors with context for debugging.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Entity not found - includes entity type and ID for actionable error messages.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Database operation failed - includes operation name for tracing.
    #[error("Database error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },

    /// Serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Business constraint violated (unique keys, foreign keys).
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

impl RepoError {
    /// Create a NotFound error with entity type and ID context.
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Create a Database error with operation context.
    pub fn database(operation: &'static str, message: impl ToString) -> Self {
        Self::Database {
            operation,
            message: message.to_string(),
        }
    }

    /// Create a Serialization error.
    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization(message.to_string())
    }

    /// Create a ConstraintViolation error.
    pub fn constraint(message: impl ToString) -> Self {
        Self::ConstraintViolation(message.to_string())
    }

    /// Check if this is a NotFound error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Uploaded file storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("File storage error in {operation}: {message}")]
    Io {
        operation: &'static str,
        message: String,
    },

    #[error("File too large: limit is {limit} bytes")]
    TooLarge { limit: u64 },
}

impl StorageError {
    pub fn io(operation: &'static str, err: impl ToString) -> Self {
        Self::Io {
            operation,
            message: err.to_string(),
        }
    }
}
