//! Development lookup server middleware

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};

use crate::common::auth;

use super::types::{ErrorResponse, MethodRules};

/// Shared server state
#[derive(Clone)]
pub struct ServerState {
    /// Key required on `/methods`; open when unset
    pub api_key: Option<String>,
    pub rules: Arc<MethodRules>,
}

impl ServerState {
    pub fn new(rules: MethodRules) -> Self {
        Self {
            api_key: None,
            rules: Arc::new(rules),
        }
    }

    /// Require `key`; blank keys leave the endpoint open
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key.filter(|k| !k.trim().is_empty());
        self
    }
}

/// API key authentication middleware
pub async fn auth_middleware(
    State(state): State<ServerState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(expected) = state.api_key.as_deref() else {
        return next.run(request).await;
    };

    match auth::extract_api_key(&request) {
        Some(key) if auth::constant_time_eq(&key, expected) => next.run(request).await,
        _ => {
            tracing::warn!("Rejected methods lookup with missing or invalid API key");
            let error = ErrorResponse::authentication_error();
            (StatusCode::UNAUTHORIZED, Json(error)).into_response()
        }
    }
}

/// CORS layer
///
/// The identifier page calls the lookup from the login domain, so every
/// origin is allowed.
pub fn cors_layer() -> tower_http::cors::CorsLayer {
    use tower_http::cors::{Any, CorsLayer};

    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
