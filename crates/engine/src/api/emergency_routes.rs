//! Emergency routes.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sidesa_domain::{Emergency, EmergencyId, EmergencyWithReporter};
use sidesa_shared::{
    CreateEmergencyRequest, DataResponse, EmergencyCounts, EmergencyListQuery, PageResponse,
};

use crate::api::auth::CurrentUser;
use crate::api::error::ApiError;
use crate::api::extract::{ApiJson, ApiQuery};
use crate::app::App;
use crate::use_cases::EmergencyError;

pub async fn list(
    State(app): State<Arc<App>>,
    ApiQuery(query): ApiQuery<EmergencyListQuery>,
) -> Result<Json<PageResponse<EmergencyWithReporter>>, ApiError> {
    Ok(Json(app.use_cases.emergency.list(&query).await?))
}

pub async fn create(
    State(app): State<Arc<App>>,
    CurrentUser(user): CurrentUser,
    ApiJson(request): ApiJson<CreateEmergencyRequest>,
) -> Result<(StatusCode, Json<DataResponse<Emergency>>), ApiError> {
    let emergency = app.use_cases.emergency.create(&user, request).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(emergency))))
}

pub async fn handle(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<Emergency>>, ApiError> {
    let emergency = app.use_cases.emergency.handle(emergency_id(&id)?).await?;
    Ok(Json(DataResponse::new(emergency)))
}

pub async fn delete(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    app.use_cases.emergency.delete(emergency_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn count(
    State(app): State<Arc<App>>,
) -> Result<Json<DataResponse<EmergencyCounts>>, ApiError> {
    let counts = app.use_cases.emergency.count().await?;
    Ok(Json(DataResponse::new(counts)))
}

fn emergency_id(raw: &str) -> Result<EmergencyId, ApiError> {
    raw.parse()
        .map_err(|_| EmergencyError::NotFound.into())
}
