//! Sidesa Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::header::HeaderName;
use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sidesa_engine::api;
use sidesa_engine::infrastructure::{
    clock::SystemClock,
    config::{load_dotenv_from_repo_root, AppConfig},
    file_storage::LocalFileStorage,
    persistence::SqliteRepository,
    ports::ClockPort,
};
use sidesa_engine::App;

const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the engine may be started from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sidesa_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Sidesa Engine");

    let config = AppConfig::from_env();

    tracing::info!("Connecting to SQLite at {}", config.database_url);
    let repos = SqliteRepository::new(&config.database_url).await?;

    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());
    let storage = Arc::new(
        LocalFileStorage::new(&config.uploads_dir, config.max_upload_bytes, clock.clone())
            .await?,
    );
    tokio::fs::create_dir_all(&config.public_images_dir).await?;

    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port).parse()?;

    tracing::info!(
        allowance = config.cooldown.allowance(),
        block_seconds = config.cooldown.block_for().num_seconds(),
        max_upload_bytes = storage.max_bytes(),
        "Emergency cooldown and upload limits configured"
    );

    let app = Arc::new(App::new(repos, storage, clock, config));

    let router = api::http::routes(app)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer_from_env());

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn build_cors_layer_from_env() -> CorsLayer {
    let allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string());
    cors_layer(&allowed_origins)
}

/// `*` allows any origin without credentials; a comma-separated list allows
/// those origins with credentials.
fn cors_layer(allowed_origins: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        // The web client sends X-User-Id and JSON content types which trigger CORS preflights.
        .allow_headers([
            HeaderName::from_static("x-user-id"),
            axum::http::header::CONTENT_TYPE,
        ]);

    if allowed_origins == "*" {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| HeaderValue::from_str(s).ok())
        .collect();

    let cors = cors.allow_credentials(true);
    if origins.is_empty() {
        tracing::warn!(
            value = %allowed_origins,
            "CORS_ALLOWED_ORIGINS has no valid origins, falling back to {}",
            DEFAULT_CORS_ORIGIN
        );
        return cors.allow_origin(HeaderValue::from_static(DEFAULT_CORS_ORIGIN));
    }

    cors.allow_origin(origins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get, Router};
    use tower::ServiceExt;

    async fn preflight(layer: CorsLayer, origin: &str) -> axum::http::HeaderMap {
        let router = Router::new()
            .route("/api/health", get(|| async { "OK" }))
            .layer(layer);
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/health")
            .header("origin", origin)
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .expect("request");
        router
            .oneshot(request)
            .await
            .expect("response")
            .headers()
            .clone()
    }

    #[tokio::test]
    async fn listed_origins_allow_credentials() {
        let headers = preflight(cors_layer("http://localhost:3000"), "http://localhost:3000").await;
        assert_eq!(
            headers["access-control-allow-origin"],
            "http://localhost:3000"
        );
        assert_eq!(headers["access-control-allow-credentials"], "true");
    }

    #[tokio::test]
    async fn wildcard_origin_omits_credentials() {
        let headers = preflight(cors_layer("*"), "http://desa.example").await;
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert!(headers.get("access-control-allow-credentials").is_none());
    }
}
