//! Coordinate correction, node lookup, batch paths and address
//! resolution. Thin call sites over the injected path engine.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    extract::{Query, State},
    Json,
};

use dmatrix_core::{
    Coord, CoordinatePath, Location, NetworkNode, PathsInput, ALLOWED_SPEED_PROFILES,
};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /correct?lat=..&long=..&country=..
pub async fn correct_coordinate(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<NetworkNode>, ApiError> {
    let (Some(raw_lat), Some(raw_long), Some(country)) =
        (params.get("lat"), params.get("long"), params.get("country"))
    else {
        return Err(ApiError::MalformedInput(format!(
            "missing parameter, need lat, long, country, you gave: {params:?}"
        )));
    };

    let lat: f64 = raw_lat.parse().map_err(|_| {
        ApiError::MalformedInput(format!("latitude {raw_lat} is invalid, cannot parse"))
    })?;
    let long: f64 = raw_long.parse().map_err(|_| {
        ApiError::MalformedInput(format!("longitude {raw_long} is invalid, cannot parse"))
    })?;

    if !state.config().allowed_countries.contains(country.as_str()) {
        return Err(ApiError::Backend(format!("country {country} not allowed")));
    }

    let node = state
        .engine()
        .correct_point(Coord(lat, long), country)
        .await
        .map_err(|err| ApiError::Backend(err.to_string()))?;
    Ok(Json(node))
}

/// GET /nodes?nodes=[..]&country=..
pub async fn nodes_to_coordinates(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Coord>>, ApiError> {
    let (Some(raw_nodes), Some(country)) = (params.get("nodes"), params.get("country")) else {
        return Err(ApiError::MalformedInput(
            "missing parameter: either nodes or country is missing".to_string(),
        ));
    };

    let nodes: Vec<i64> = serde_json::from_str(raw_nodes)
        .map_err(|err| ApiError::MalformedInput(format!("could not parse nodes: {err}")))?;

    let coordinates = state
        .engine()
        .node_coordinates(country, &nodes)
        .await
        .map_err(|err| ApiError::Backend(err.to_string()))?;
    Ok(Json(coordinates))
}

/// POST /paths
pub async fn coordinate_paths(
    State(state): State<Arc<AppState>>,
    body: Result<Json<PathsInput>, JsonRejection>,
) -> Result<Json<Vec<CoordinatePath>>, ApiError> {
    let Json(input) = body.map_err(|rejection| {
        ApiError::MalformedInput(format!("couldn't parse JSON: {rejection}"))
    })?;

    if !ALLOWED_SPEED_PROFILES.contains(&input.speed_profile) {
        return Err(ApiError::InvalidInput(format!(
            "speed profile '{}' makes no sense, must be one of {ALLOWED_SPEED_PROFILES:?}",
            input.speed_profile
        )));
    }

    let computed = state
        .engine()
        .coordinate_paths(&input)
        .await
        .map_err(|err| ApiError::InvalidInput(format!("couldn't resolve paths: {err}")))?;
    Ok(Json(computed))
}

/// POST /resolve
pub async fn resolve_locations(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Vec<Location>>, JsonRejection>,
) -> Result<Json<Vec<Location>>, ApiError> {
    let Json(locations) = body.map_err(|rejection| {
        ApiError::MalformedInput(format!("couldn't parse JSON: {rejection}"))
    })?;

    let mut resolved = Vec::with_capacity(locations.len());
    for location in &locations {
        let resolved_location = state
            .engine()
            .resolve_location(location)
            .await
            .map_err(|err| ApiError::InvalidInput(format!("resolution failure: {err}")))?;
        resolved.push(resolved_location);
    }
    Ok(Json(resolved))
}
