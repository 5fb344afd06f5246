//! HTTP API.
//!
//! A thin axum layer over [`TaskStore`]. All routes live under `/api`:
//!
//! | Method | Path | Success |
//! |--------|------|---------|
//! | GET | `/api/` | 200 service banner |
//! | GET | `/api/health` | 200 `{"ok": true}` |
//! | GET | `/api/tasks` | 200 tasks in creation order |
//! | POST | `/api/tasks` | 201 `{"task", "meta"}` |
//! | PATCH | `/api/tasks/{task_id}` | 200 `{"task", "meta"}` |
//! | DELETE | `/api/tasks/{task_id}` | 204 |
//!
//! Errors carry `{"detail": "..."}`: 422 for validation and malformed
//! bodies, 404 for unknown ids, 500 for everything else.

mod error;
mod handlers;
mod types;

pub use error::ApiError;
pub use types::{CreateTaskRequest, HealthStatus, PatchTaskRequest, ServiceInfo, TaskResponse};

use crate::config::TaskboardConfig;
use crate::services::TaskStore;
use crate::{Error, Result};
use axum::Router;
use axum::extract::{MatchedPath, Request};
use axum::http::{HeaderValue, header};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, patch};
use std::future::Future;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

/// State shared by all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The task store.
    pub store: Arc<TaskStore>,
}

/// Builds the API router.
///
/// `cors_origins` containing `*` (or nothing) allows any origin without
/// credentials; an explicit list allows credentials for those origins.
pub fn router(store: Arc<TaskStore>, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/api", get(handlers::root))
        .route("/api/", get(handlers::root))
        .route("/api/health", get(handlers::health))
        .route(
            "/api/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route(
            "/api/tasks/{task_id}",
            patch(handlers::patch_task).delete(handlers::delete_task),
        )
        .route_layer(middleware::from_fn(track_requests))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { store })
}

/// Serves the API until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn serve<F>(config: &TaskboardConfig, store: Arc<TaskStore>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(store, &config.cors_origins);
    let addr = config.bind_addr();

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::operation("bind", format!("{addr}: {e}")))?;
    tracing::info!(addr = %addr, "Task board API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::operation("serve", e))?;

    tracing::info!("Task board API stopped");
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            },
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Counts requests by method, matched route and status.
async fn track_requests(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_string(), |path| path.as_str().to_string());

    let response = next.run(request).await;

    metrics::counter!(
        "taskboard_http_requests_total",
        "method" => method,
        "route" => route,
        "status" => response.status().as_u16().to_string()
    )
    .increment(1);

    response
}
