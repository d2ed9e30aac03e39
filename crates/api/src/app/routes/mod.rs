use axum::{routing::get, Router};

pub mod events;
pub mod registrations;
pub mod system;
pub mod users;

/// Router for endpoints that need no token.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .merge(users::public_router())
        .merge(events::public_router())
}

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .merge(users::router())
        .merge(events::router())
        .merge(registrations::router())
}
