//! Map feature entity - Typed geometry drawn on the village map.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Coordinates, DomainError, MapFeatureId};

/// Category of a map feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MapType {
    Boundary,
    Settlement,
    Facility,
    Agriculture,
    Road,
    Water,
}

impl MapType {
    pub const ALL: [MapType; 6] = [
        Self::Boundary,
        Self::Settlement,
        Self::Facility,
        Self::Agriculture,
        Self::Road,
        Self::Water,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boundary => "BOUNDARY",
            Self::Settlement => "SETTLEMENT",
            Self::Facility => "FACILITY",
            Self::Agriculture => "AGRICULTURE",
            Self::Road => "ROAD",
            Self::Water => "WATER",
        }
    }
}

impl fmt::Display for MapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MapType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| DomainError::parse(format!("Unknown map type: {s}")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapFeature {
    pub id: MapFeatureId,
    #[serde(rename = "type")]
    pub map_type: MapType,
    pub name: String,
    pub description: String,
    pub year: i32,
    pub coordinates: Coordinates,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub area: Option<f64>,
    pub radius: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMapFeature {
    pub map_type: MapType,
    pub name: String,
    pub description: String,
    pub year: i32,
    pub coordinates: Coordinates,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub area: Option<f64>,
    pub radius: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Partial update; coordinates are always resubmitted.
#[derive(Debug, Clone, PartialEq)]
pub struct MapFeatureChanges {
    pub map_type: Option<MapType>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub year: Option<i32>,
    pub coordinates: Coordinates,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub area: Option<f64>,
    pub radius: Option<f64>,
}

impl MapFeature {
    pub fn apply(&mut self, changes: MapFeatureChanges, now: DateTime<Utc>) {
        if let Some(map_type) = changes.map_type {
            self.map_type = map_type;
        }
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(year) = changes.year {
            self.year = year;
        }
        self.coordinates = changes.coordinates;
        if changes.icon.is_some() {
            self.icon = changes.icon;
        }
        if changes.color.is_some() {
            self.color = changes.color;
        }
        if changes.area.is_some() {
            self.area = changes.area;
        }
        if changes.radius.is_some() {
            self.radius = changes.radius;
        }
        self.updated_at = now;
    }
}
