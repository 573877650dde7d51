use axum::{routing::get, Router};

pub mod common;
pub mod export;
pub mod import;
pub mod order;
pub mod product;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/order", order::router())
        .nest("/export", export::router())
        .nest("/import", import::router())
        .nest("/product", product::router())
}
