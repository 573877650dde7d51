use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use depot_core::{CustomerId, FacilityId, ProductId, SaleOrderId, WarehouseId};
use depot_infra::services::ExportOutcome;
use depot_inventory::{InventoryItem, InventoryItemDetail, StockReceipt};
use depot_products::NewProductPrice;
use depot_sales::{NewSaleOrder, OrderLine, SaleOrder, SaleOrderItem};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct OrderProductRequest {
    #[serde(rename = "id")]
    pub product_id: ProductId,
    pub quantity: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOrderRequest {
    pub customer_id: CustomerId,
    pub warehouse_id: WarehouseId,
    pub products: Vec<OrderProductRequest>,
    #[serde(default)]
    pub address: String,
    pub customer_store_id: Option<FacilityId>,
}

impl AddOrderRequest {
    pub fn into_new_order(self) -> NewSaleOrder {
        NewSaleOrder {
            customer_id: self.customer_id,
            warehouse_id: self.warehouse_id,
            lines: self
                .products
                .into_iter()
                .map(|p| OrderLine {
                    product_id: p.product_id,
                    quantity: p.quantity,
                })
                .collect(),
            ship_to_address: self.address,
            customer_store_id: self.customer_store_id,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportItemRequest {
    pub sale_order_id: SaleOrderId,
    pub sale_order_seq: i32,
    /// Defaults to the time the request is handled.
    pub effective_from: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct SaleOrderIdRequest {
    pub id: SaleOrderId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddInventoryItemRequest {
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub currency_uom_id: String,
}

impl From<AddInventoryItemRequest> for StockReceipt {
    fn from(body: AddInventoryItemRequest) -> Self {
        StockReceipt {
            product_id: body.product_id,
            warehouse_id: body.warehouse_id,
            quantity: body.quantity,
            unit_cost: body.unit_cost,
            currency_uom_id: body.currency_uom_id,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddProductPriceRequest {
    pub product_id: ProductId,
    pub price: Decimal,
    pub currency_uom_id: String,
    /// Defaults to the time the request is handled.
    pub effective_from: Option<DateTime<Utc>>,
}

impl AddProductPriceRequest {
    pub fn into_new_price(self, now: DateTime<Utc>) -> NewProductPrice {
        NewProductPrice {
            product_id: self.product_id,
            price: self.price,
            currency_uom_id: self.currency_uom_id,
            effective_from: self.effective_from.unwrap_or(now),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryQuery {
    pub product_id: Option<ProductId>,
}

#[derive(Debug, Deserialize)]
pub struct EffectivePriceQuery {
    pub at: Option<DateTime<Utc>>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrderResponse {
    pub order: SaleOrder,
    pub order_items: Vec<SaleOrderItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListResponse {
    pub order_count: usize,
    pub order_list: Vec<SaleOrder>,
}

impl From<Vec<SaleOrder>> for OrderListResponse {
    fn from(order_list: Vec<SaleOrder>) -> Self {
        Self {
            order_count: order_list.len(),
            order_list,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryListResponse {
    pub inventory_count: usize,
    pub inventory_list: Vec<InventoryItem>,
}

impl From<Vec<InventoryItem>> for InventoryListResponse {
    fn from(inventory_list: Vec<InventoryItem>) -> Self {
        Self {
            inventory_count: inventory_list.len(),
            inventory_list,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResponse {
    /// `exported` or `already_exported`.
    pub result: &'static str,
    pub details: Vec<InventoryItemDetail>,
    pub order_status: Option<depot_sales::SaleOrderStatus>,
}

impl From<ExportOutcome> for ExportResponse {
    fn from(outcome: ExportOutcome) -> Self {
        match outcome {
            ExportOutcome::Exported { details, order_status } => Self {
                result: "exported",
                details,
                order_status: Some(order_status),
            },
            ExportOutcome::AlreadyExported => Self {
                result: "already_exported",
                details: Vec::new(),
                order_status: None,
            },
        }
    }
}
