use std::sync::OnceLock;

use regex_lite::Regex;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use super::issue;
use crate::de;

/// Body of `POST /api/private/emergencies`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateEmergencyRequest {
    #[validate(length(min = 10, max = 15, message = "phone_number must be 10-15 characters"))]
    pub phone_number: String,
    #[validate(length(min = 5, max = 500, message = "message must be 5-500 characters"))]
    pub message: String,
    #[serde(deserialize_with = "de::text_lenient")]
    #[validate(custom(function = "validate_latitude"))]
    pub latitude: String,
    #[serde(deserialize_with = "de::text_lenient")]
    #[validate(custom(function = "validate_longitude"))]
    pub longitude: String,
}

fn decimal_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("static decimal pattern"))
}

/// Signed decimal degrees such as `-7.0512` or `110`.
pub fn is_decimal(value: &str) -> bool {
    decimal_pattern().is_match(value)
}

fn validate_latitude(value: &str) -> Result<(), ValidationError> {
    if is_decimal(value) {
        Ok(())
    } else {
        Err(issue("invalid_latitude", "Invalid latitude"))
    }
}

fn validate_longitude(value: &str) -> Result<(), ValidationError> {
    if is_decimal(value) {
        Ok(())
    } else {
        Err(issue("invalid_longitude", "Invalid longitude"))
    }
}

/// Query string of the admin emergency listing. Values stay raw text so the
/// use case can report type errors per field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmergencyListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub is_handled: Option<String>,
}
