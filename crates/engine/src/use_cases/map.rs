//! Map feature use cases.

use std::sync::Arc;

use serde_json::Value;
use sidesa_domain::{
    Coordinates, DomainError, MapFeature, MapFeatureChanges, MapFeatureId, MapType, NewMapFeature,
};
use sidesa_shared::{CreateMapRequest, MapListQuery, UpdateMapRequest};
use validator::Validate;

use crate::infrastructure::ports::{ClockPort, MapFeatureFilter, MapFeatureRepo, RepoError};
use crate::use_cases::validation::ValidationFailure;

#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
    #[error("Map not found")]
    NotFound,
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

/// Collects field issues across derive rules and domain parsing so that one
/// response lists every problem.
struct Checks {
    failure: ValidationFailure,
}

impl Checks {
    fn of(request: &impl Validate) -> Self {
        let failure = match request.validate() {
            Ok(()) => ValidationFailure { issues: Vec::new() },
            Err(errors) => errors.into(),
        };
        Self { failure }
    }

    fn map_type(&mut self, raw: &str) -> Option<MapType> {
        match raw.parse() {
            Ok(map_type) => Some(map_type),
            Err(_) => {
                let allowed: Vec<&str> = MapType::ALL.iter().map(MapType::as_str).collect();
                self.failure.extend(ValidationFailure::single(
                    "type",
                    "invalid_value",
                    format!("type must be one of {}", allowed.join(", ")),
                ));
                None
            }
        }
    }

    fn coordinates(&mut self, raw: Value) -> Option<Coordinates> {
        match Coordinates::from_json_value(raw) {
            Ok(coordinates) => Some(coordinates),
            Err(DomainError::Parse(message)) => {
                self.failure.extend(ValidationFailure::single(
                    "coordinates",
                    "invalid_coordinates_format",
                    message,
                ));
                None
            }
            Err(other) => {
                self.failure.extend(ValidationFailure::single(
                    "coordinates",
                    "invalid_coordinates",
                    other.to_string(),
                ));
                None
            }
        }
    }

    fn year(&mut self, raw: &str) -> Option<i32> {
        match raw.trim().parse() {
            Ok(year) => Some(year),
            Err(_) => {
                self.failure.extend(ValidationFailure::single(
                    "year",
                    "invalid_type",
                    "year must be an integer",
                ));
                None
            }
        }
    }

    fn finish(self) -> Result<(), MapError> {
        if self.failure.is_empty() {
            Ok(())
        } else {
            Err(self.failure.into())
        }
    }

    /// Every parser that yields `None` records an issue.
    fn finish_with<T>(self, parsed: Option<T>) -> Result<T, MapError> {
        match parsed {
            Some(value) if self.failure.is_empty() => Ok(value),
            _ => Err(self.failure.into()),
        }
    }
}

pub struct MapUseCases {
    repo: Arc<dyn MapFeatureRepo>,
    clock: Arc<dyn ClockPort>,
}

impl MapUseCases {
    pub fn new(repo: Arc<dyn MapFeatureRepo>, clock: Arc<dyn ClockPort>) -> Self {
        Self { repo, clock }
    }

    pub async fn create(&self, request: CreateMapRequest) -> Result<MapFeature, MapError> {
        let mut checks = Checks::of(&request);
        let map_type = checks.map_type(&request.map_type);
        let coordinates = checks.coordinates(request.coordinates);
        let (map_type, coordinates) = checks.finish_with(map_type.zip(coordinates))?;

        let feature = self
            .repo
            .create(&NewMapFeature {
                map_type,
                name: request.name,
                description: request.description,
                year: request.year,
                coordinates,
                icon: request.icon,
                color: request.color,
                area: request.area,
                radius: request.radius,
                created_at: self.clock.now(),
            })
            .await?;

        tracing::info!(map_id = %feature.id, map_type = %feature.map_type, "Map feature created");
        Ok(feature)
    }

    pub async fn list(&self, query: &MapListQuery) -> Result<Vec<MapFeature>, MapError> {
        let mut checks = Checks {
            failure: ValidationFailure { issues: Vec::new() },
        };
        let map_type = non_empty(query.map_type.as_deref()).and_then(|raw| checks.map_type(raw));
        let year = non_empty(query.year.as_deref()).and_then(|raw| checks.year(raw));
        checks.finish()?;

        Ok(self.repo.list(MapFeatureFilter { map_type, year }).await?)
    }

    pub async fn get(&self, id: MapFeatureId) -> Result<MapFeature, MapError> {
        self.repo.get(id).await?.ok_or(MapError::NotFound)
    }

    pub async fn update(
        &self,
        id: MapFeatureId,
        request: UpdateMapRequest,
    ) -> Result<MapFeature, MapError> {
        let mut checks = Checks::of(&request);
        let map_type = match request.map_type.as_deref() {
            Some(raw) => checks.map_type(raw),
            None => None,
        };
        let coordinates = checks.coordinates(request.coordinates);
        let coordinates = checks.finish_with(coordinates)?;

        let mut feature = self.get(id).await?;
        feature.apply(
            MapFeatureChanges {
                map_type,
                name: request.name,
                description: request.description,
                year: request.year,
                coordinates,
                icon: request.icon,
                color: request.color,
                area: request.area,
                radius: request.radius,
            },
            self.clock.now(),
        );
        self.repo.update(&feature).await.map_err(|e| match e {
            RepoError::NotFound { .. } => MapError::NotFound,
            other => other.into(),
        })?;

        tracing::info!(map_id = %id, "Map feature updated");
        Ok(feature)
    }

    pub async fn delete(&self, id: MapFeatureId) -> Result<(), MapError> {
        self.get(id).await?;
        self.repo.delete(id).await?;
        tracing::info!(map_id = %id, "Map feature deleted");
        Ok(())
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::ports::MockMapFeatureRepo;
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 5, 9, 30, 0).single().expect("time")
    }

    fn use_cases(repo: MockMapFeatureRepo) -> MapUseCases {
        MapUseCases::new(Arc::new(repo), Arc::new(FixedClock(now())))
    }

    fn create_request(body: Value) -> CreateMapRequest {
        serde_json::from_value(body).expect("request body")
    }

    fn stored(id: i64) -> MapFeature {
        MapFeature {
            id: MapFeatureId::new(id),
            map_type: MapType::Agriculture,
            name: "Sawah Lor".to_string(),
            description: "Lahan sawah irigasi".to_string(),
            year: 2023,
            coordinates: Coordinates::Path(vec![vec![110.0, -7.0], vec![110.1, -7.0]]),
            icon: None,
            color: Some("#84cc16".to_string()),
            area: Some(3.5),
            radius: None,
            created_at: now(),
            updated_at: now(),
        }
    }

    #[tokio::test]
    async fn create_decodes_string_coordinates() {
        let mut repo = MockMapFeatureRepo::new();
        repo.expect_create()
            .withf(|f| {
                f.map_type == MapType::Facility
                    && f.coordinates == Coordinates::Point(vec![110.4, -7.0])
                    && f.created_at == now()
            })
            .returning(|f| {
                Ok(MapFeature {
                    id: MapFeatureId::new(1),
                    map_type: f.map_type,
                    name: f.name.clone(),
                    description: f.description.clone(),
                    year: f.year,
                    coordinates: f.coordinates.clone(),
                    icon: f.icon.clone(),
                    color: f.color.clone(),
                    area: f.area,
                    radius: f.radius,
                    created_at: f.created_at,
                    updated_at: f.created_at,
                })
            });

        let feature = use_cases(repo)
            .create(create_request(json!({
                "type": "facility",
                "name": "Balai Desa",
                "description": "Kantor kepala desa",
                "year": 2020,
                "coordinates": "[110.4, -7.0]"
            })))
            .await
            .expect("create");

        assert_eq!(feature.id, MapFeatureId::new(1));
    }

    #[tokio::test]
    async fn create_reports_type_and_coordinate_issues_together() {
        let result = use_cases(MockMapFeatureRepo::new())
            .create(create_request(json!({
                "type": "MOUNTAIN",
                "name": "",
                "description": "Gunung",
                "year": 2020,
                "coordinates": "[110.4, -7.0"
            })))
            .await;

        let Err(MapError::Validation(failure)) = result else {
            panic!("expected validation failure");
        };
        let codes: Vec<&str> = failure.issues.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, vec!["length", "invalid_value", "invalid_coordinates_format"]);
    }

    #[tokio::test]
    async fn wrong_coordinate_shape_is_rejected() {
        let result = use_cases(MockMapFeatureRepo::new())
            .create(create_request(json!({
                "type": "ROAD",
                "name": "Jalan",
                "description": "Jalan desa",
                "year": 2020,
                "coordinates": [["a", "b"]]
            })))
            .await;

        let Err(MapError::Validation(failure)) = result else {
            panic!("expected validation failure");
        };
        assert_eq!(failure.issues[0].code, "invalid_coordinates");
    }

    #[tokio::test]
    async fn update_reports_bad_coordinates_without_loading() {
        let request: UpdateMapRequest = serde_json::from_value(json!({
            "type": "LAKE",
            "coordinates": "[1, 2"
        }))
        .expect("request body");

        let result = use_cases(MockMapFeatureRepo::new())
            .update(MapFeatureId::new(4), request)
            .await;

        let Err(MapError::Validation(failure)) = result else {
            panic!("expected validation failure");
        };
        let codes: Vec<&str> = failure.issues.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, vec!["invalid_value", "invalid_coordinates_format"]);
    }

    #[tokio::test]
    async fn list_parses_filters() {
        let mut repo = MockMapFeatureRepo::new();
        repo.expect_list()
            .withf(|filter| filter.map_type == Some(MapType::Water) && filter.year == Some(2024))
            .returning(|_| Ok(vec![stored(1)]));

        let features = use_cases(repo)
            .list(&MapListQuery {
                map_type: Some("water".to_string()),
                year: Some("2024".to_string()),
            })
            .await
            .expect("list");

        assert_eq!(features.len(), 1);
    }

    #[tokio::test]
    async fn list_rejects_bad_filters() {
        let result = use_cases(MockMapFeatureRepo::new())
            .list(&MapListQuery {
                map_type: Some("VOLCANO".to_string()),
                year: Some("baru".to_string()),
            })
            .await;

        let Err(MapError::Validation(failure)) = result else {
            panic!("expected validation failure");
        };
        assert_eq!(failure.issues.len(), 2);
    }

    #[tokio::test]
    async fn update_applies_partial_changes() {
        let mut repo = MockMapFeatureRepo::new();
        repo.expect_get()
            .withf(|id| *id == MapFeatureId::new(5))
            .returning(|id| Ok(Some(stored(id.get()))));
        repo.expect_update()
            .withf(|f| {
                f.name == "Sawah Kidul"
                    && f.map_type == MapType::Agriculture
                    && f.coordinates == Coordinates::Point(vec![1.0, 2.0])
                    && f.color.as_deref() == Some("#84cc16")
                    && f.updated_at == now()
            })
            .returning(|_| Ok(()));

        let request: UpdateMapRequest = serde_json::from_value(json!({
            "name": "Sawah Kidul",
            "coordinates": [1, 2]
        }))
        .expect("request body");
        let feature = use_cases(repo)
            .update(MapFeatureId::new(5), request)
            .await
            .expect("update");

        assert_eq!(feature.description, "Lahan sawah irigasi");
    }

    #[tokio::test]
    async fn update_and_delete_unknown_feature_are_not_found() {
        let mut repo = MockMapFeatureRepo::new();
        repo.expect_get().returning(|_| Ok(None));
        let use_cases = use_cases(repo);

        let request: UpdateMapRequest =
            serde_json::from_value(json!({"coordinates": [1, 2]})).expect("request body");
        assert!(matches!(
            use_cases.update(MapFeatureId::new(9), request).await,
            Err(MapError::NotFound)
        ));
        assert!(matches!(
            use_cases.delete(MapFeatureId::new(9)).await,
            Err(MapError::NotFound)
        ));
    }
}
