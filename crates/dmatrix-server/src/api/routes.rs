//! Route table and cross-cutting handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::api::{geo, matrix};
use crate::error::ApiError;
use crate::state::AppState;

/// Create the API router.
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(|| async { "OK" }).options(preflight))
        .route("/status", get(server_status).options(preflight))
        .route("/dm", post(matrix::submit_matrix).options(preflight))
        .route("/dm/:id", get(matrix::matrix_progress).options(preflight))
        .route(
            "/dm/:id/result",
            get(matrix::matrix_result).options(preflight),
        )
        .route("/correct", get(geo::correct_coordinate).options(preflight))
        .route("/nodes", get(geo::nodes_to_coordinates).options(preflight))
        .route("/paths", post(geo::coordinate_paths).options(preflight))
        .route("/resolve", post(geo::resolve_locations).options(preflight))
        .fallback(preflight_or_not_found)
}

/// Empty JSON with permissive CORS headers, for any OPTIONS request.
async fn preflight() -> Response {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                "Authorization, Content-Type, If-None-Match",
            ),
            (
                header::ACCESS_CONTROL_ALLOW_METHODS,
                "GET, PUT, POST, DELETE",
            ),
        ],
        Json(json!({})),
    )
        .into_response()
}

async fn preflight_or_not_found(method: Method) -> Response {
    if method == Method::OPTIONS {
        preflight().await
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

/// Relational backend health probe. Reports OK without probing when no
/// database is configured; the result cache is the only state the
/// service owns.
async fn server_status(State(state): State<Arc<AppState>>) -> Response {
    let config = state.config();
    let (Some(user), Some(db)) = (config.db_user.as_deref(), config.db_name.as_deref()) else {
        return "OK".into_response();
    };

    let url = format!("postgres://{user}@localhost/{db}?sslmode=disable");
    let pool = match sqlx::postgres::PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&url)
        .await
    {
        Ok(pool) => pool,
        Err(err) => {
            return ApiError::Backend(format!("Could not connect to database: {err}"))
                .into_response()
        }
    };

    match sqlx::query("SELECT 1").execute(&pool).await {
        Ok(_) => "OK".into_response(),
        Err(err) => {
            ApiError::Backend(format!("Could not connect to database: {err}")).into_response()
        }
    }
}
