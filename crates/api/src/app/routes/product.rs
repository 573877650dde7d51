use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use depot_core::ProductId;

use crate::app::routes::common::parse_path_id;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/add-product-price", post(add_product_price))
        .route("/:id/effective-price", get(effective_price))
}

pub async fn add_product_price(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::AddProductPriceRequest>,
) -> axum::response::Response {
    let now = Utc::now();

    match services.set_price(body.into_new_price(now), principal.user_id(), now).await {
        Ok(price) => (StatusCode::CREATED, Json(price)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn effective_price(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Query(query): Query<dto::EffectivePriceQuery>,
) -> axum::response::Response {
    let product_id: ProductId = match parse_path_id(&id, "product") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.effective_price(product_id, query.at.unwrap_or_else(Utc::now)).await {
        Ok(Some(price)) => (StatusCode::OK, Json(price)).into_response(),
        Ok(None) => errors::json_error(
            StatusCode::NOT_FOUND,
            "price_not_found",
            format!("no effective price for product {product_id}"),
        ),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
