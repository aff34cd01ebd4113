//! HTTP API application wiring (Axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: infrastructure wiring (stores, repositories, tokens)
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: response JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};

use crate::middleware::{self, AuthState};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::{AppServices, build_services};

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(jwt_secret: String) -> Router {
    build_app_with(Arc::new(build_services(&jwt_secret)))
}

/// Build the router around an existing service graph (tests seed data
/// through the services before spawning the server).
pub fn build_app_with(services: Arc<AppServices>) -> Router {
    let auth_state = AuthState {
        services: Arc::clone(&services),
    };

    let customer = routes::customer_router().layer(axum::middleware::from_fn_with_state(
        auth_state.clone(),
        middleware::customer_auth,
    ));

    let admin = routes::admin_router().layer(axum::middleware::from_fn_with_state(
        auth_state.clone(),
        middleware::admin_auth,
    ));

    let v1 = routes::public_router()
        .merge(customer)
        .merge(admin)
        .layer(Extension(services));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/v1", v1)
}
