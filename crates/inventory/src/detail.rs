use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use depot_core::{InventoryItemDetailId, InventoryItemId, SaleOrderId};

use crate::fifo::LotConsumption;

/// Export audit row: which lot satisfied which order line, and by how much.
///
/// Append-only; one row per lot touched by an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemDetail {
    pub id: InventoryItemDetailId,
    pub inventory_item_id: InventoryItemId,
    pub exported_quantity: Decimal,
    pub effective_from: DateTime<Utc>,
    pub sale_order_id: SaleOrderId,
    pub sale_order_seq: i32,
}

impl InventoryItemDetail {
    pub fn for_consumption(
        consumption: &LotConsumption,
        sale_order_id: SaleOrderId,
        sale_order_seq: i32,
        effective_from: DateTime<Utc>,
    ) -> Self {
        Self {
            id: InventoryItemDetailId::new(),
            inventory_item_id: consumption.lot_id,
            exported_quantity: consumption.quantity,
            effective_from,
            sale_order_id,
            sale_order_seq,
        }
    }
}
