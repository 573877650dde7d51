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
use depot_infra::services::ExportSaleOrderItem;

use crate::app::routes::common::parse_path_id;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/export-sale-order-item", post(export_sale_order_item))
        .route("/complete-sales-order", post(complete_sales_order))
        .route("/exportable-sales-orders", get(exportable_sales_orders))
        .route("/completed-sales-orders", get(completed_sales_orders))
        .route("/sale-orders/:id/details", get(export_details))
}

/// Re-exporting an exported line answers 200 with `result: already_exported`.
pub async fn export_sale_order_item(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::ExportItemRequest>,
) -> axum::response::Response {
    let cmd = ExportSaleOrderItem {
        sale_order_id: body.sale_order_id,
        sale_order_seq: body.sale_order_seq,
        effective_from: body.effective_from.unwrap_or_else(Utc::now),
    };

    match services.export_item(cmd).await {
        Ok(outcome) => (StatusCode::OK, Json(dto::ExportResponse::from(outcome))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn complete_sales_order(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::SaleOrderIdRequest>,
) -> axum::response::Response {
    match services.complete_order(body.id, Utc::now()).await {
        Ok(order) => (StatusCode::OK, Json(order)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn exportable_sales_orders(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.exportable_orders().await {
        Ok(orders) => (StatusCode::OK, Json(dto::OrderListResponse::from(orders))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn completed_sales_orders(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.completed_orders().await {
        Ok(orders) => (StatusCode::OK, Json(dto::OrderListResponse::from(orders))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn export_details(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: SaleOrderId = match parse_path_id(&id, "sale order") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.export_details(id).await {
        Ok(details) => (StatusCode::OK, Json(details)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
