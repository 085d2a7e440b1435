//! Development methods-lookup server
//!
//! Answers `POST /methods` from a JSON rules file so the identifier screen
//! can be exercised without the production webhook.
//!
//! # Usage
//! ```ignore
//! let rules = MethodRules::load("methods.json")?;
//! let state = ServerState::new(rules).with_api_key(Some(key));
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! ```

mod handlers;
mod middleware;
mod router;
pub mod types;

pub use middleware::ServerState;
pub use router::create_router;
pub use types::{MethodRule, MethodRules};
