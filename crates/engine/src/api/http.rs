//! HTTP routes.
//!
//! * `/api/...` is public.
//! * `/api/private/...` needs a known `X-User-Id`. Regulation writes there are admin-only.
//! * `/api/admin/...` needs an admin.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use tower_http::services::ServeDir;

use crate::api::auth::{require_admin, require_user};
use crate::api::error::ApiError;
use crate::api::{emergency_routes, map_routes, regulation_routes, user_routes};
use crate::app::App;

/// Create all HTTP routes.
pub fn routes(app: Arc<App>) -> Router {
    let images = ServeDir::new(&app.config.public_images_dir);

    Router::new()
        .nest_service("/api/public/images", images)
        .nest("/api/private", private_routes(&app))
        .nest("/api/admin", admin_routes(&app))
        .nest("/api", public_routes())
        .fallback(not_found)
        .with_state(app)
}

fn public_routes() -> Router<Arc<App>> {
    Router::new()
        .route("/health", get(health))
        .route("/regulations", get(regulation_routes::list))
        .route("/regulations/{id}", get(regulation_routes::get))
        .route("/regulations/{id}/download", get(regulation_routes::download))
        .route("/regulations/{id}/preview", get(regulation_routes::preview))
        .route("/maps", get(map_routes::list))
        .route("/maps/{id}", get(map_routes::get))
        .route("/users", post(user_routes::register))
}

fn private_routes(app: &Arc<App>) -> Router<Arc<App>> {
    let regulations = Router::new()
        .route("/regulations", post(regulation_routes::create))
        .route(
            "/regulations/{id}",
            put(regulation_routes::update).delete(regulation_routes::delete),
        )
        .route_layer(middleware::from_fn(require_admin))
        .layer(DefaultBodyLimit::max(app.config.body_limit()));

    Router::new()
        .route("/users/current", get(user_routes::current))
        .route("/emergencies", post(emergency_routes::create))
        .merge(regulations)
        .route_layer(middleware::from_fn_with_state(app.clone(), require_user))
}

fn admin_routes(app: &Arc<App>) -> Router<Arc<App>> {
    Router::new()
        .route("/emergencies", get(emergency_routes::list))
        .route("/emergencies/count", get(emergency_routes::count))
        .route(
            "/emergencies/{id}",
            patch(emergency_routes::handle).delete(emergency_routes::delete),
        )
        .route("/maps", post(map_routes::create))
        .route(
            "/maps/{id}",
            put(map_routes::update).delete(map_routes::delete),
        )
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(app.clone(), require_user))
}

async fn health() -> &'static str {
    "OK"
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Not Found".into())
}
