//! Map feature repository implementation for SQLite

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;

use super::connection::SqliteConnection;
use super::{column, encode_time, time_column, write_error};
use crate::infrastructure::ports::{MapFeatureFilter, MapFeatureRepo, RepoError};
use sidesa_domain::{Coordinates, MapFeature, MapFeatureId, MapType, NewMapFeature};

const SELECT_MAP_FEATURE: &str = "SELECT id, type, name, description, year, coordinates, icon, color, area, radius, created_at, updated_at FROM map_features";

/// Repository for MapFeature operations
pub struct SqliteMapFeatureRepository {
    connection: SqliteConnection,
}

impl SqliteMapFeatureRepository {
    pub fn new(connection: SqliteConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl MapFeatureRepo for SqliteMapFeatureRepository {
    async fn create(&self, feature: &NewMapFeature) -> Result<MapFeature, RepoError> {
        let created_at = encode_time(feature.created_at);
        let result = sqlx::query(
            "INSERT INTO map_features (type, name, description, year, coordinates, icon, color,
                area, radius, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(feature.map_type.as_str())
        .bind(&feature.name)
        .bind(&feature.description)
        .bind(feature.year)
        .bind(feature.coordinates.to_json())
        .bind(&feature.icon)
        .bind(&feature.color)
        .bind(feature.area)
        .bind(feature.radius)
        .bind(&created_at)
        .bind(&created_at)
        .execute(self.connection.pool())
        .await
        .map_err(|e| write_error("map_feature.create", e))?;

        let id = MapFeatureId::new(result.last_insert_rowid());
        tracing::debug!("Created map feature {} ({}): {}", id, feature.map_type, feature.name);

        Ok(MapFeature {
            id,
            map_type: feature.map_type,
            name: feature.name.clone(),
            description: feature.description.clone(),
            year: feature.year,
            coordinates: feature.coordinates.clone(),
            icon: feature.icon.clone(),
            color: feature.color.clone(),
            area: feature.area,
            radius: feature.radius,
            created_at: feature.created_at,
            updated_at: feature.created_at,
        })
    }

    async fn get(&self, id: MapFeatureId) -> Result<Option<MapFeature>, RepoError> {
        let row = sqlx::query(&format!("{SELECT_MAP_FEATURE} WHERE id = ?"))
            .bind(id.get())
            .fetch_optional(self.connection.pool())
            .await
            .map_err(|e| RepoError::database("map_feature.get", e))?;

        row.as_ref().map(row_to_map_feature).transpose()
    }

    async fn list(&self, filter: MapFeatureFilter) -> Result<Vec<MapFeature>, RepoError> {
        let rows = sqlx::query(&format!(
            "{SELECT_MAP_FEATURE}
            WHERE (?1 IS NULL OR type = ?1) AND (?2 IS NULL OR year = ?2)
            ORDER BY created_at DESC, id DESC"
        ))
        .bind(filter.map_type.map(|t| t.as_str()))
        .bind(filter.year)
        .fetch_all(self.connection.pool())
        .await
        .map_err(|e| RepoError::database("map_feature.list", e))?;

        rows.iter().map(row_to_map_feature).collect()
    }

    async fn update(&self, feature: &MapFeature) -> Result<(), RepoError> {
        let result = sqlx::query(
            "UPDATE map_features
            SET type = ?, name = ?, description = ?, year = ?, coordinates = ?, icon = ?,
                color = ?, area = ?, radius = ?, updated_at = ?
            WHERE id = ?",
        )
        .bind(feature.map_type.as_str())
        .bind(&feature.name)
        .bind(&feature.description)
        .bind(feature.year)
        .bind(feature.coordinates.to_json())
        .bind(&feature.icon)
        .bind(&feature.color)
        .bind(feature.area)
        .bind(feature.radius)
        .bind(encode_time(feature.updated_at))
        .bind(feature.id.get())
        .execute(self.connection.pool())
        .await
        .map_err(|e| write_error("map_feature.update", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("MapFeature", feature.id));
        }
        tracing::debug!("Updated map feature {}", feature.id);
        Ok(())
    }

    async fn delete(&self, id: MapFeatureId) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM map_features WHERE id = ?")
            .bind(id.get())
            .execute(self.connection.pool())
            .await
            .map_err(|e| RepoError::database("map_feature.delete", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("MapFeature", id));
        }
        tracing::debug!("Deleted map feature {}", id);
        Ok(())
    }
}

fn row_to_map_feature(row: &SqliteRow) -> Result<MapFeature, RepoError> {
    let map_type: String = column(row, "type")?;
    let coordinates: String = column(row, "coordinates")?;

    Ok(MapFeature {
        id: MapFeatureId::new(column(row, "id")?),
        map_type: MapType::from_str(&map_type).map_err(RepoError::serialization)?,
        name: column(row, "name")?,
        description: column(row, "description")?,
        year: column(row, "year")?,
        coordinates: Coordinates::from_json(&coordinates).map_err(RepoError::serialization)?,
        icon: column(row, "icon")?,
        color: column(row, "color")?,
        area: column(row, "area")?,
        radius: column(row, "radius")?,
        created_at: time_column(row, "created_at")?,
        updated_at: time_column(row, "updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    async fn repo() -> SqliteMapFeatureRepository {
        let connection = SqliteConnection::in_memory().await.expect("in-memory sqlite");
        SqliteMapFeatureRepository::new(connection)
    }

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 10, 12, 0, 0).single().expect("time")
    }

    fn feature(map_type: MapType, year: i32, coordinates: Coordinates, at: DateTime<Utc>) -> NewMapFeature {
        NewMapFeature {
            map_type,
            name: format!("{map_type} {year}"),
            description: "Dusun Krajan".to_string(),
            year,
            coordinates,
            icon: None,
            color: Some("#22c55e".to_string()),
            area: Some(12.5),
            radius: None,
            created_at: at,
        }
    }

    #[tokio::test]
    async fn coordinates_survive_storage_in_both_shapes() {
        let repo = repo().await;
        let point = Coordinates::Point(vec![110.42, -7.05]);
        let path = Coordinates::Path(vec![vec![110.0, -7.0], vec![110.1, -7.1], vec![110.2, -7.0]]);

        let a = repo
            .create(&feature(MapType::Facility, 2024, point.clone(), base_time()))
            .await
            .expect("create point");
        let b = repo
            .create(&feature(MapType::Boundary, 2024, path.clone(), base_time()))
            .await
            .expect("create path");

        assert_eq!(repo.get(a.id).await.expect("get").expect("present").coordinates, point);
        assert_eq!(repo.get(b.id).await.expect("get").expect("present").coordinates, path);
    }

    #[tokio::test]
    async fn list_filters_by_type_and_year() {
        let repo = repo().await;
        let point = Coordinates::Point(vec![110.0, -7.0]);
        repo.create(&feature(MapType::Road, 2023, point.clone(), base_time())).await.expect("create");
        repo.create(&feature(MapType::Road, 2024, point.clone(), base_time() + Duration::minutes(1)))
            .await
            .expect("create");
        repo.create(&feature(MapType::Water, 2024, point.clone(), base_time() + Duration::minutes(2)))
            .await
            .expect("create");

        let roads = repo
            .list(MapFeatureFilter {
                map_type: Some(MapType::Road),
                year: None,
            })
            .await
            .expect("list");
        assert_eq!(roads.len(), 2);
        assert_eq!(roads[0].year, 2024);

        let in_2024 = repo
            .list(MapFeatureFilter {
                map_type: None,
                year: Some(2024),
            })
            .await
            .expect("list");
        let types: Vec<MapType> = in_2024.iter().map(|f| f.map_type).collect();
        assert_eq!(types, vec![MapType::Water, MapType::Road]);

        assert_eq!(repo.list(MapFeatureFilter::default()).await.expect("list").len(), 3);
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_rows() {
        let repo = repo().await;
        let mut stored = repo
            .create(&feature(MapType::Settlement, 2022, Coordinates::Point(vec![1.0, 2.0]), base_time()))
            .await
            .expect("create");

        stored.name = "Dusun Baru".to_string();
        stored.radius = Some(40.0);
        repo.update(&stored).await.expect("update");
        let reloaded = repo.get(stored.id).await.expect("get").expect("present");
        assert_eq!(reloaded.name, "Dusun Baru");
        assert_eq!(reloaded.radius, Some(40.0));

        repo.delete(stored.id).await.expect("delete");
        assert!(repo.update(&stored).await.expect_err("gone").is_not_found());
        assert!(repo.delete(stored.id).await.expect_err("gone").is_not_found());
    }
}
