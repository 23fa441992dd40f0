//! Authentication middleware for HTTP routes.
//!
//! Callers identify themselves with the `X-User-Id` header. The id is looked
//! up in the database and the loaded [`User`] is attached to the request.
//!
//! # Usage
//!
//! ```rust,ignore
//! let private = Router::new()
//!     .route("/users/current", get(current))
//!     .route_layer(middleware::from_fn_with_state(app.clone(), require_user));
//!
//! async fn current(CurrentUser(user): CurrentUser) -> impl IntoResponse { ... }
//! ```

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use sidesa_domain::{User, UserId};

use crate::api::error::ApiError;
use crate::app::App;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller, inserted by [`require_user`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Reject requests without a known `X-User-Id` with 401.
pub async fn require_user(
    State(app): State<Arc<App>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user_id = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<UserId>().ok())
        .ok_or(ApiError::Unauthorized)?;

    let Some(user) = app.use_cases.user.authenticate(user_id).await? else {
        tracing::debug!(user_id = %user_id, "Unknown user id");
        return Err(ApiError::Unauthorized);
    };

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Must run after [`require_user`]. Non-admins get 403.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    match request.extensions().get::<CurrentUser>() {
        Some(CurrentUser(user)) if user.is_admin() => Ok(next.run(request).await),
        Some(CurrentUser(user)) => {
            tracing::debug!(user_id = %user.id, "Admin route refused");
            Err(ApiError::Forbidden("Admin access required".into()))
        }
        None => Err(ApiError::Unauthorized),
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(ApiError::Unauthorized)
    }
}
