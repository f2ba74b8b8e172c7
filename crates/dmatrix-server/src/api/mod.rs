//! HTTP surface for the dmatrix service.

pub mod geo;
pub mod matrix;
mod routes;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    routes::create_router()
}
