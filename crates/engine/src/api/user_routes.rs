//! User registration and the authenticated profile.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use sidesa_domain::User;
use sidesa_shared::{DataResponse, RegisterUserRequest};

use crate::api::auth::CurrentUser;
use crate::api::error::ApiError;
use crate::api::extract::ApiJson;
use crate::app::App;

pub async fn register(
    State(app): State<Arc<App>>,
    ApiJson(request): ApiJson<RegisterUserRequest>,
) -> Result<(StatusCode, Json<DataResponse<User>>), ApiError> {
    let user = app.use_cases.user.register(request).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(user))))
}

pub async fn current(CurrentUser(user): CurrentUser) -> Json<DataResponse<User>> {
    Json(DataResponse::new(user))
}
