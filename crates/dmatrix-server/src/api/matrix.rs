//! Matrix submission, progress polling and result retrieval.

use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;

use dmatrix_core::{validate_submission, JobState, SubmitMatrix};

use crate::dedup::SubmitDecision;
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::FetchError;

/// Accept a matrix computation. Returns 201 with the job location; an
/// identical in-flight or cached submission is answered with the same id
/// without launching another execution.
pub async fn submit_matrix(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SubmitMatrix>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(raw) = body.map_err(|rejection| {
        ApiError::MalformedInput(format!("could not read submission body: {rejection}"))
    })?;

    let request = validate_submission(&raw, &state.config().allowed_countries)?;

    // Capacity is reserved before the record is created, so a rejected
    // submission never leaves a pending record behind.
    let slot = state.executor().try_reserve().ok_or(ApiError::Backpressure)?;

    let decision = state.dedup().submit(&request);
    let id = decision.id().to_string();
    let already_satisfied = decision.already_satisfied();

    match decision {
        SubmitDecision::Launch { id } => {
            state.executor().spawn(
                slot,
                Arc::clone(state.store()),
                Arc::clone(state.engine()),
                id,
                request,
            );
        }
        SubmitDecision::Reuse { .. } | SubmitDecision::Alias { .. } => drop(slot),
    }

    let location = format!("/dm/{id}");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(json!({ "id": id, "already_satisfied": already_satisfied })),
    )
        .into_response())
}

/// Poll a computation. Complete jobs redirect to the result resource;
/// anything else reports its progress, including a recorded failure.
pub async fn matrix_progress(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let status = state.store().status(&id).ok_or(ApiError::Expired)?;

    if status.state == JobState::Complete {
        return Ok(Redirect::to(&format!("/dm/{id}/result")).into_response());
    }

    let mut body = json!({ "progress": status.state });
    if let Some(error) = status.error {
        body["error"] = json!(error);
    }
    Ok(Json(body).into_response())
}

/// Fetch a completed result, following alias indirection.
pub async fn matrix_result(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let payload = state.store().resolve(&id).map_err(|err| match err {
        FetchError::NotReady => ApiError::NotReady,
        FetchError::Expired => ApiError::Expired,
        FetchError::Failed(cause) => ApiError::Backend(format!("computation failed: {cause}")),
    })?;

    // the payload is already serialized JSON; wrap it without re-parsing
    let body = format!("{{ \"Matrix\": {payload} }}");
    Ok((
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response())
}
