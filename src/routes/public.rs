use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any
/// client: the token exchange itself and the health probe. Everything else
/// in the API sits behind the bearer-token extractor.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // A simple, unauthenticated endpoint used for monitoring and load
        // balancer checks. Returns "ok" immediately.
        .route("/health", get(|| async { "ok" }))
        // POST /token
        // Exchanges username+password for a signed, time-limited bearer
        // token carrying subject identity and role.
        .route("/token", post(handlers::login))
}
