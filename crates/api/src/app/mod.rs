//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: ledger backend selection (in-memory or Postgres)
//! - `routes/`: HTTP routes + handlers (one file per area: order, export, import, product)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use depot_infra::config::AppConfig;
use depot_infra::ledger::LedgerResult;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> LedgerResult<Router> {
    let services = services::build_services(config).await?;
    Ok(router_with(config.jwt_secret.clone(), services))
}

/// Router over already-built services.
pub fn router_with(jwt_secret: String, services: services::AppServices) -> Router {
    let jwt = Arc::new(depot_auth::Hs256JwtValidator::new(jwt_secret.into_bytes()));
    let auth_state = middleware::AuthState { jwt };

    // Protected routes: require a valid bearer token.
    let protected = routes::router()
        .layer(Extension(Arc::new(services)))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(ServiceBuilder::new())
}
