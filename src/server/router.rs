//! Development lookup server routing

use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::{
    handlers::{health, post_methods},
    middleware::{ServerState, auth_middleware, cors_layer},
};

/// Create the lookup server router
///
/// # Endpoints
/// - `POST /methods` - Sign-in methods for an identifier
/// - `GET /health` - Liveness and loaded rule count
///
/// # Authentication
/// `/methods` requires the configured key (`x-api-key` or
/// `Authorization: Bearer <key>`) when one is set.
pub fn create_router(state: ServerState) -> Router {
    let methods_routes = Router::new()
        .route("/methods", post(post_methods))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(methods_routes)
        .layer(cors_layer())
        .with_state(state)
}
