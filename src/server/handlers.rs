//! Development lookup server handlers

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use crate::methods::LookupRequest;

use super::middleware::ServerState;
use super::types::{ErrorResponse, HealthResponse};

/// GET /health
pub async fn health(State(state): State<ServerState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        rules: state.rules.rules.len(),
    })
}

/// POST /methods
pub async fn post_methods(
    State(state): State<ServerState>,
    Json(payload): Json<LookupRequest>,
) -> Response {
    let identifier = payload.identifier.trim();
    if identifier.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::invalid_request("identifier is required")),
        )
            .into_response();
    }

    let response = state.rules.resolve(identifier);
    tracing::info!(
        methods = response.methods.len(),
        "Answered methods lookup"
    );
    Json(response).into_response()
}
