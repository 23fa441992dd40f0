//! Map feature routes.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sidesa_domain::{MapFeature, MapFeatureId};
use sidesa_shared::{CreateMapRequest, DataResponse, MapListQuery, UpdateMapRequest};

use crate::api::error::ApiError;
use crate::api::extract::{serial_id, ApiJson, ApiQuery};
use crate::app::App;
use crate::use_cases::MapError;

pub async fn list(
    State(app): State<Arc<App>>,
    ApiQuery(query): ApiQuery<MapListQuery>,
) -> Result<Json<DataResponse<Vec<MapFeature>>>, ApiError> {
    let features = app.use_cases.map.list(&query).await?;
    Ok(Json(DataResponse::new(features)))
}

pub async fn get(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<MapFeature>>, ApiError> {
    let feature = app.use_cases.map.get(map_feature_id(&id)?).await?;
    Ok(Json(DataResponse::new(feature)))
}

pub async fn create(
    State(app): State<Arc<App>>,
    ApiJson(request): ApiJson<CreateMapRequest>,
) -> Result<(StatusCode, Json<DataResponse<MapFeature>>), ApiError> {
    let feature = app.use_cases.map.create(request).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(feature))))
}

pub async fn update(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateMapRequest>,
) -> Result<Json<DataResponse<MapFeature>>, ApiError> {
    let feature = app
        .use_cases
        .map
        .update(map_feature_id(&id)?, request)
        .await?;
    Ok(Json(DataResponse::new(feature)))
}

pub async fn delete(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    app.use_cases.map.delete(map_feature_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn map_feature_id(raw: &str) -> Result<MapFeatureId, ApiError> {
    serial_id(raw)
        .map(MapFeatureId::new)
        .ok_or_else(|| MapError::NotFound.into())
}
