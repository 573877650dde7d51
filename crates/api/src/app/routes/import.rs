use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use depot_core::WarehouseId;
use depot_infra::services::ReceiveStock;

use crate::app::routes::common::parse_path_id;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/add-inventory-item", post(add_inventory_item))
        .route("/warehouses/:id/inventory", get(list_inventory))
        .route("/warehouses/:id/statistics", get(list_statistics))
}

pub async fn add_inventory_item(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::AddInventoryItemRequest>,
) -> axum::response::Response {
    let cmd = ReceiveStock {
        receipt: body.into(),
        received_at: Utc::now(),
    };

    match services.receive_stock(cmd).await {
        Ok(received) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "inventoryItem": received.lot,
                "statistics": received.statistics,
            })),
        )
            .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn list_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Query(query): Query<dto::InventoryQuery>,
) -> axum::response::Response {
    let warehouse_id: WarehouseId = match parse_path_id(&id, "warehouse") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.lots(warehouse_id, query.product_id).await {
        Ok(lots) => (StatusCode::OK, Json(dto::InventoryListResponse::from(lots))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn list_statistics(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let warehouse_id: WarehouseId = match parse_path_id(&id, "warehouse") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.statistics(warehouse_id).await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
