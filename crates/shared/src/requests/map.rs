use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use crate::de;

/// Body of `POST /api/admin/maps`.
///
/// `type` stays raw text and `coordinates` a raw JSON value; both are
/// checked against the domain types by the use case.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateMapRequest {
    #[serde(rename = "type")]
    pub map_type: String,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[serde(deserialize_with = "de::i32_lenient")]
    #[validate(range(min = 1900, message = "year must be 1900 or later"))]
    pub year: i32,
    pub coordinates: Value,
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "icon must be 1-255 characters"))]
    pub icon: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 9, message = "color must be 1-9 characters"))]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "de::option_f64_lenient")]
    #[validate(range(min = 0.0, message = "area must not be negative"))]
    pub area: Option<f64>,
    #[serde(default, deserialize_with = "de::option_f64_lenient")]
    #[validate(range(min = 0.0, message = "radius must not be negative"))]
    pub radius: Option<f64>,
}

/// Body of `PUT /api/admin/maps/{id}`. Every field but `coordinates` is optional.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateMapRequest {
    #[serde(default, rename = "type")]
    pub map_type: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "name is required"))]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "description is required"))]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de::option_i32_lenient")]
    #[validate(range(min = 1900, message = "year must be 1900 or later"))]
    pub year: Option<i32>,
    pub coordinates: Value,
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "icon must be 1-255 characters"))]
    pub icon: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 9, message = "color must be 1-9 characters"))]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "de::option_f64_lenient")]
    #[validate(range(min = 0.0, message = "area must not be negative"))]
    pub area: Option<f64>,
    #[serde(default, deserialize_with = "de::option_f64_lenient")]
    #[validate(range(min = 0.0, message = "radius must not be negative"))]
    pub radius: Option<f64>,
}

/// Filters of the public map listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MapListQuery {
    #[serde(rename = "type")]
    pub map_type: Option<String>,
    pub year: Option<String>,
}
