//! Geometry of a map feature.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::DomainError;

/// Either a single position (`[x, y]`) or a path/polygon ring (`[[x, y], ...]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coordinates {
    Point(Vec<f64>),
    Path(Vec<Vec<f64>>),
}

impl Coordinates {
    /// Accepts the decoded array or a JSON-encoded string of it, as sent by
    /// multipart forms.
    ///
    /// A string that is not JSON yields [`DomainError::Parse`]; a value of the
    /// wrong shape yields [`DomainError::Validation`].
    pub fn from_json_value(value: Value) -> Result<Self, DomainError> {
        let value = match value {
            Value::String(raw) => serde_json::from_str::<Value>(&raw)
                .map_err(|e| DomainError::parse(format!("invalid coordinates format: {e}")))?,
            other => other,
        };

        serde_json::from_value(value).map_err(|_| {
            DomainError::validation("coordinates must be an array of numbers or of number arrays")
        })
    }

    /// Decode the persisted form.
    pub fn from_json(raw: &str) -> Result<Self, DomainError> {
        serde_json::from_str(raw).map_err(|e| DomainError::parse(e.to_string()))
    }

    pub fn to_json(&self) -> String {
        match self {
            Self::Point(values) => Value::from(values.clone()).to_string(),
            Self::Path(points) => Value::from(points.clone()).to_string(),
        }
    }

    pub fn is_point(&self) -> bool {
        matches!(self, Self::Point(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_point() {
        let coords = Coordinates::from_json_value(json!([110.42, -7.05])).expect("point");
        assert_eq!(coords, Coordinates::Point(vec![110.42, -7.05]));
        assert!(coords.is_point());
    }

    #[test]
    fn accepts_polygon_ring() {
        let coords =
            Coordinates::from_json_value(json!([[110.0, -7.0], [110.1, -7.0], [110.1, -7.1]]))
                .expect("polygon");
        assert!(matches!(coords, Coordinates::Path(ref points) if points.len() == 3));
    }

    #[test]
    fn decodes_json_encoded_strings() {
        let coords = Coordinates::from_json_value(json!("[[1, 2], [3, 4]]")).expect("string");
        assert_eq!(coords, Coordinates::Path(vec![vec![1.0, 2.0], vec![3.0, 4.0]]));
    }

    #[test]
    fn unparseable_string_is_a_format_error() {
        let err = Coordinates::from_json_value(json!("[[1, 2")).expect_err("bad json");
        assert!(matches!(err, DomainError::Parse(_)));
    }

    #[test]
    fn mixed_shapes_are_rejected() {
        let err = Coordinates::from_json_value(json!([1, [2, 3]])).expect_err("mixed");
        assert!(matches!(err, DomainError::Validation(_)));

        let err = Coordinates::from_json_value(json!({"lat": 1})).expect_err("object");
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn empty_geometry_is_accepted() {
        assert_eq!(
            Coordinates::from_json_value(json!([])).expect("empty point"),
            Coordinates::Point(vec![])
        );
        assert_eq!(
            Coordinates::from_json_value(json!([[]])).expect("empty ring"),
            Coordinates::Path(vec![vec![]])
        );
    }

    #[test]
    fn persisted_form_round_trips() {
        let coords = Coordinates::Path(vec![vec![1.5, 2.0], vec![3.0, 4.25]]);
        let restored = Coordinates::from_json(&coords.to_json()).expect("decode");
        assert_eq!(restored, coords);
    }
}
