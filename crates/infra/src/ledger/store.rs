//! Storage seam of the ledger.
//!
//! `LedgerStore` opens transactions and serves read-only views. `LedgerTx` holds
//! one open transaction and exposes the primitives the ledger services compose.
//! A `LedgerTx` dropped without `commit` rolls back, so a cancelled caller leaves
//! the ledger at its last committed state.
//!
//! Writers lock the (warehouse, product) statistics row before any lot row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use depot_core::{InventoryItemId, ProductId, ProductPriceId, SaleOrderId, UserId, WarehouseId};
use depot_inventory::{InventoryItem, InventoryItemDetail, LotBalance, StockReceipt, WarehouseProductStatistics};
use depot_products::{EffectivePrice, ProductPrice};
use depot_sales::{NewSaleOrder, SaleOrder, SaleOrderItem, SaleOrderStatus};

use super::error::LedgerResult;

/// Transaction isolation requested by a ledger operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Isolation {
    ReadCommitted,
    RepeatableRead,
}

/// An order line as the export path sees it: the line plus the product its
/// pinned price belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportLine {
    pub item: SaleOrderItem,
    pub product_id: ProductId,
}

/// A sale order line joined with its pinned price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleOrderLineView {
    pub sale_order_seq: i32,
    pub product_id: ProductId,
    pub product_price_id: ProductPriceId,
    pub price: Decimal,
    pub currency_uom_id: String,
    pub quantity: Decimal,
    pub exported: bool,
}

/// A sale order with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleOrderView {
    #[serde(flatten)]
    pub order: SaleOrder,
    pub items: Vec<SaleOrderLineView>,
}

#[async_trait]
pub trait LedgerStore: Send + Sync + 'static {
    type Tx: LedgerTx;

    async fn begin(&self, isolation: Isolation) -> LedgerResult<Self::Tx>;

    async fn sale_order(&self, id: SaleOrderId) -> LedgerResult<Option<SaleOrderView>>;

    /// Orders currently in any of `statuses`, oldest first.
    async fn sale_orders_by_status(&self, statuses: &[SaleOrderStatus]) -> LedgerResult<Vec<SaleOrder>>;

    /// Lots of a warehouse (optionally of one product), in receipt order.
    async fn lots(
        &self,
        warehouse_id: WarehouseId,
        product_id: Option<ProductId>,
    ) -> LedgerResult<Vec<InventoryItem>>;

    async fn statistics(&self, warehouse_id: WarehouseId) -> LedgerResult<Vec<WarehouseProductStatistics>>;

    /// Export audit rows of an order, in insertion order per line.
    async fn export_details(&self, sale_order_id: SaleOrderId) -> LedgerResult<Vec<InventoryItemDetail>>;

    async fn effective_price(
        &self,
        product_id: ProductId,
        at: DateTime<Utc>,
    ) -> LedgerResult<Option<EffectivePrice>>;
}

#[async_trait]
pub trait LedgerTx: Send {
    async fn effective_price(
        &mut self,
        product_id: ProductId,
        at: DateTime<Utc>,
    ) -> LedgerResult<Option<EffectivePrice>>;

    /// Close every price of the product that a price starting at `effective_from`
    /// supersedes; returns how many rows were closed.
    async fn close_superseded_prices(
        &mut self,
        product_id: ProductId,
        effective_from: DateTime<Utc>,
    ) -> LedgerResult<u64>;

    async fn insert_price(&mut self, price: &ProductPrice) -> LedgerResult<()>;

    /// Read the statistics row and hold its lock until the transaction ends.
    async fn lock_statistics(
        &mut self,
        warehouse_id: WarehouseId,
        product_id: ProductId,
    ) -> LedgerResult<Option<WarehouseProductStatistics>>;

    async fn update_statistics(&mut self, statistics: &WarehouseProductStatistics) -> LedgerResult<()>;

    /// Additive upsert of one receipt into the statistics row.
    async fn add_receipt_to_statistics(
        &mut self,
        warehouse_id: WarehouseId,
        product_id: ProductId,
        quantity: Decimal,
    ) -> LedgerResult<WarehouseProductStatistics>;

    async fn insert_lot(&mut self, receipt: &StockReceipt, at: DateTime<Utc>) -> LedgerResult<InventoryItem>;

    /// Lots with stock on hand, oldest first, locked until the transaction ends.
    async fn lock_lots_for_export(
        &mut self,
        warehouse_id: WarehouseId,
        product_id: ProductId,
    ) -> LedgerResult<Vec<LotBalance>>;

    async fn deplete_lot(&mut self, lot_id: InventoryItemId, quantity: Decimal) -> LedgerResult<()>;

    async fn insert_item_detail(&mut self, detail: &InventoryItemDetail) -> LedgerResult<()>;

    async fn insert_sale_order(
        &mut self,
        order: &NewSaleOrder,
        created_by: UserId,
        at: DateTime<Utc>,
    ) -> LedgerResult<SaleOrder>;

    async fn insert_sale_order_item(&mut self, item: &SaleOrderItem) -> LedgerResult<()>;

    async fn lock_sale_order(&mut self, id: SaleOrderId) -> LedgerResult<Option<SaleOrder>>;

    async fn lock_sale_order_item(
        &mut self,
        id: SaleOrderId,
        seq: i32,
    ) -> LedgerResult<Option<ExportLine>>;

    async fn mark_item_exported(&mut self, id: SaleOrderId, seq: i32) -> LedgerResult<()>;

    async fn count_unexported_items(&mut self, id: SaleOrderId) -> LedgerResult<i64>;

    /// `UPDATE ... WHERE id = $id AND status = $expected`; returns affected rows.
    async fn update_sale_order_status(
        &mut self,
        id: SaleOrderId,
        expected: SaleOrderStatus,
        next: SaleOrderStatus,
        at: DateTime<Utc>,
    ) -> LedgerResult<u64>;

    async fn commit(self) -> LedgerResult<()>;
}
