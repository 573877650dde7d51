use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use depot_core::SaleOrderId;
use depot_infra::services::PlaceOrder;

use crate::app::routes::common::parse_path_id;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/add-order", post(add_order))
        .route("/sale-orders/:id", get(get_sale_order))
        .route("/sale-orders/:id/accept", post(accept_sale_order))
        .route("/sale-orders/:id/cancel", post(cancel_sale_order))
}

pub async fn add_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::AddOrderRequest>,
) -> axum::response::Response {
    let cmd = PlaceOrder {
        order: body.into_new_order(),
        actor: principal.user_id(),
        placed_at: Utc::now(),
    };

    match services.place_order(cmd).await {
        Ok(placed) => (
            StatusCode::CREATED,
            Json(dto::PlacedOrderResponse {
                order: placed.order,
                order_items: placed.items,
            }),
        )
            .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn get_sale_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: SaleOrderId = match parse_path_id(&id, "sale order") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.sale_order(id).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn accept_sale_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: SaleOrderId = match parse_path_id(&id, "sale order") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.accept_order(id, Utc::now()).await {
        Ok(order) => (StatusCode::OK, Json(order)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn cancel_sale_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: SaleOrderId = match parse_path_id(&id, "sale order") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.cancel_order(id, Utc::now()).await {
        Ok(order) => (StatusCode::OK, Json(order)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
