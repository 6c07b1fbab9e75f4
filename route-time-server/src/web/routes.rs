//! HTTP route handlers.

use std::path::Path;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tower_http::services::{ServeDir, ServeFile};
use tracing::{error, info, warn};

use crate::estimate::Estimator;
use crate::resolve::{ResolveError, find_overlapping_routes, resolve, search_routes};

use super::dto::*;
use super::state::AppState;

/// Page served at `/`, relative to the static directory.
pub const DASHBOARD_PAGE: &str = "dashboard.html";

/// Create the application router.
///
/// `static_dir` holds the dashboard page and its assets.
pub fn create_router(state: AppState, static_dir: &Path) -> Router {
    let dashboard = static_dir.join(DASHBOARD_PAGE);
    Router::new()
        .route("/health", get(health))
        .route("/api/route", get(route_times))
        .route("/api/search", get(search))
        .route("/api/overlap", get(overlap))
        .route("/api/status", get(status))
        .route_service("/", ServeFile::new(&dashboard))
        .route_service("/index.html", ServeFile::new(&dashboard))
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Resolve a route variant and estimate its travel times.
async fn route_times(
    State(state): State<AppState>,
    Query(req): Query<RouteRequest>,
) -> Result<Json<RouteResponse>, AppError> {
    let route = non_empty(req.id.as_deref())
        .ok_or_else(|| AppError::BadRequest {
            message: "Missing route id".to_string(),
        })?
        .to_string();
    let end = parse_index("end", req.end.as_deref())?;
    let dest = non_empty(req.dest.as_deref()).map(str::to_string);
    let start = parse_index("start", req.start.as_deref())?.unwrap_or(0);
    let variant = parse_index("variant", req.variant.as_deref())?.unwrap_or(0);

    info!(route = %route, start, ?end, variant, ?dest, "route request");

    let db = state.routes.current().await;
    let corpus = state.corpus.clone();
    let config = state.estimate.clone();

    // file reads and the simulation are blocking
    let response = tokio::task::spawn_blocking(move || {
        let resolved = resolve(&db, &route, variant, dest.as_deref())?;
        let data = Estimator::new(&*corpus, &*config).estimate(
            &resolved.stop_ids,
            start,
            end,
            resolved.frequency.as_ref(),
        );
        Ok::<_, ResolveError>(RouteResponse::new(resolved, data))
    })
    .await
    .map_err(|e| AppError::Internal {
        message: format!("estimation task failed: {e}"),
    })??;

    Ok(Json(response))
}

fn parse_index(name: &str, value: Option<&str>) -> Result<Option<i64>, AppError> {
    non_empty(value)
        .map(|v| {
            v.parse::<i64>().map_err(|_| AppError::BadRequest {
                message: format!("Invalid {name} index: {v}"),
            })
        })
        .transpose()
}

/// Search route numbers by prefix.
async fn search(
    State(state): State<AppState>,
    Query(req): Query<SearchRequest>,
) -> Json<Vec<SearchResult>> {
    let db = state.routes.current().await;
    let results = search_routes(&db, &req.q)
        .into_iter()
        .map(SearchResult::from)
        .collect();
    Json(results)
}

/// Other routes serving the same pair of stops.
async fn overlap(
    State(state): State<AppState>,
    Query(req): Query<OverlapRequest>,
) -> Result<Json<Vec<String>>, AppError> {
    let (Some(start), Some(end)) = (
        non_empty(req.start.as_deref()),
        non_empty(req.end.as_deref()),
    ) else {
        return Err(AppError::BadRequest {
            message: "Missing start or end stop".to_string(),
        });
    };
    let exclude = non_empty(req.exclude.as_deref());

    let db = state.routes.current().await;
    Ok(Json(find_overlapping_routes(&db, start, end, exclude)))
}

/// Route database snapshot status.
async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let db = state.routes.current().await;
    let loaded_at = state.routes.loaded_at().await;
    Json(StatusResponse {
        loaded_at: loaded_at.to_rfc3339(),
        routes: db.route_count(),
        stops: db.stop_count(),
    })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<ResolveError> for AppError {
    fn from(e: ResolveError) -> Self {
        info!(error = %e, "route not resolved");
        AppError::NotFound {
            message: "Route not found".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, error = %message, "request failed");
        } else {
            warn!(%status, error = %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
