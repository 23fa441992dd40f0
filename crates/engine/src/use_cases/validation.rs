//! Common validation helpers for use cases.

use sidesa_shared::FieldIssue;
use validator::ValidationErrors;

/// One or more request fields failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Validation failed: {}", summary(.issues))]
pub struct ValidationFailure {
    pub issues: Vec<FieldIssue>,
}

impl ValidationFailure {
    pub fn single(field: &str, code: &str, message: impl Into<String>) -> Self {
        Self {
            issues: vec![FieldIssue {
                field: field.to_string(),
                code: code.to_string(),
                message: message.into(),
            }],
        }
    }

    /// Merge another failure's issues into this one.
    pub fn extend(&mut self, other: ValidationFailure) {
        self.issues.extend(other.issues);
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl From<ValidationErrors> for ValidationFailure {
    fn from(errors: ValidationErrors) -> Self {
        let mut issues: Vec<FieldIssue> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| FieldIssue {
                    field: field.to_string(),
                    code: error.code.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{field} is invalid")),
                })
            })
            .collect();
        // field_errors() is a HashMap
        issues.sort_by(|a, b| a.field.cmp(&b.field));
        Self { issues }
    }
}

/// Validate a derive-annotated request, converting failures.
pub fn validate<T: validator::Validate>(request: &T) -> Result<(), ValidationFailure> {
    request.validate().map_err(ValidationFailure::from)
}

/// Validate a string length is within range (in characters).
pub fn require_length_range(
    value: &str,
    min: usize,
    max: usize,
    field_name: &str,
) -> Result<(), ValidationFailure> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(ValidationFailure::single(
            field_name,
            "length",
            format!("{field_name} must be {min}-{max} characters"),
        ));
    }
    Ok(())
}

fn summary(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("{}: {}", issue.field, issue.message))
        .collect::<Vec<_>>()
        .join("; ")
}
