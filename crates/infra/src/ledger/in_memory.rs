use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};

use depot_core::{InventoryItemId, ProductId, SaleOrderId, UserId, WarehouseId};
use depot_inventory::{InventoryItem, InventoryItemDetail, LotBalance, StockReceipt, WarehouseProductStatistics};
use depot_products::{EffectivePrice, ProductPrice, resolve_effective, supersede_open_prices};
use depot_sales::{NewSaleOrder, SaleOrder, SaleOrderItem, SaleOrderStatus};

use super::error::{LedgerError, LedgerResult};
use super::store::{ExportLine, Isolation, LedgerStore, LedgerTx, SaleOrderLineView, SaleOrderView};

#[derive(Debug, Clone, Default)]
struct LedgerState {
    prices: Vec<ProductPrice>,
    statistics: BTreeMap<(WarehouseId, ProductId), WarehouseProductStatistics>,
    lots: BTreeMap<InventoryItemId, InventoryItem>,
    orders: BTreeMap<SaleOrderId, SaleOrder>,
    items: BTreeMap<(SaleOrderId, i32), SaleOrderItem>,
    details: Vec<InventoryItemDetail>,
    last_lot_id: i64,
    last_sale_order_id: i64,
}

impl LedgerState {
    fn effective_price(&self, product_id: ProductId, at: DateTime<Utc>) -> Option<EffectivePrice> {
        resolve_effective(&self.prices, product_id, at).map(ProductPrice::as_effective)
    }

    fn order_view(&self, id: SaleOrderId) -> Option<SaleOrderView> {
        let order = self.orders.get(&id)?.clone();
        let items = self
            .items
            .range((id, i32::MIN)..=(id, i32::MAX))
            .filter_map(|(_, item)| {
                let price = self.prices.iter().find(|p| p.id == item.product_price_id)?;
                Some(SaleOrderLineView {
                    sale_order_seq: item.sale_order_seq,
                    product_id: price.product_id,
                    product_price_id: price.id,
                    price: price.price,
                    currency_uom_id: price.currency_uom_id.clone(),
                    quantity: item.quantity,
                    exported: item.exported,
                })
            })
            .collect();
        Some(SaleOrderView { order, items })
    }
}

/// In-memory ledger store.
///
/// Intended for tests/dev. A transaction holds the single state lock for its
/// whole lifetime and works on a copy; commit swaps the copy in. Transactions
/// are therefore fully serialized, which satisfies every row-lock requirement of
/// the Postgres store trivially.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedgerStore {
    state: Arc<Mutex<LedgerState>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Open in-memory transaction. Dropping it discards `working`.
#[derive(Debug)]
pub struct InMemoryLedgerTx {
    guard: OwnedMutexGuard<LedgerState>,
    working: LedgerState,
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    type Tx = InMemoryLedgerTx;

    async fn begin(&self, _isolation: Isolation) -> LedgerResult<Self::Tx> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(InMemoryLedgerTx { guard, working })
    }

    async fn sale_order(&self, id: SaleOrderId) -> LedgerResult<Option<SaleOrderView>> {
        Ok(self.state.lock().await.order_view(id))
    }

    async fn sale_orders_by_status(&self, statuses: &[SaleOrderStatus]) -> LedgerResult<Vec<SaleOrder>> {
        let state = self.state.lock().await;
        Ok(state
            .orders
            .values()
            .filter(|o| statuses.contains(&o.status))
            .cloned()
            .collect())
    }

    async fn lots(
        &self,
        warehouse_id: WarehouseId,
        product_id: Option<ProductId>,
    ) -> LedgerResult<Vec<InventoryItem>> {
        let state = self.state.lock().await;
        Ok(state
            .lots
            .values()
            .filter(|l| l.warehouse_id == warehouse_id && product_id.is_none_or(|p| l.product_id == p))
            .cloned()
            .collect())
    }

    async fn statistics(&self, warehouse_id: WarehouseId) -> LedgerResult<Vec<WarehouseProductStatistics>> {
        let state = self.state.lock().await;
        Ok(state
            .statistics
            .values()
            .filter(|s| s.warehouse_id == warehouse_id)
            .cloned()
            .collect())
    }

    async fn export_details(&self, sale_order_id: SaleOrderId) -> LedgerResult<Vec<InventoryItemDetail>> {
        let state = self.state.lock().await;
        let mut details: Vec<_> = state
            .details
            .iter()
            .filter(|d| d.sale_order_id == sale_order_id)
            .cloned()
            .collect();
        // Stable: rows of one line keep their insertion (FIFO) order.
        details.sort_by_key(|d| d.sale_order_seq);
        Ok(details)
    }

    async fn effective_price(
        &self,
        product_id: ProductId,
        at: DateTime<Utc>,
    ) -> LedgerResult<Option<EffectivePrice>> {
        Ok(self.state.lock().await.effective_price(product_id, at))
    }
}

#[async_trait]
impl LedgerTx for InMemoryLedgerTx {
    async fn effective_price(
        &mut self,
        product_id: ProductId,
        at: DateTime<Utc>,
    ) -> LedgerResult<Option<EffectivePrice>> {
        Ok(self.working.effective_price(product_id, at))
    }

    async fn close_superseded_prices(
        &mut self,
        product_id: ProductId,
        effective_from: DateTime<Utc>,
    ) -> LedgerResult<u64> {
        Ok(supersede_open_prices(
            self.working.prices.iter_mut(),
            product_id,
            effective_from,
        ))
    }

    async fn insert_price(&mut self, price: &ProductPrice) -> LedgerResult<()> {
        if self.working.prices.iter().any(|p| p.id == price.id) {
            return Err(LedgerError::Conflict(format!("product price {} already exists", price.id)));
        }
        self.working.prices.push(price.clone());
        Ok(())
    }

    async fn lock_statistics(
        &mut self,
        warehouse_id: WarehouseId,
        product_id: ProductId,
    ) -> LedgerResult<Option<WarehouseProductStatistics>> {
        Ok(self.working.statistics.get(&(warehouse_id, product_id)).cloned())
    }

    async fn update_statistics(&mut self, statistics: &WarehouseProductStatistics) -> LedgerResult<()> {
        statistics.check_invariants()?;
        let key = (statistics.warehouse_id, statistics.product_id);
        match self.working.statistics.get_mut(&key) {
            Some(row) => {
                *row = statistics.clone();
                Ok(())
            }
            None => Err(LedgerError::not_found(format!(
                "statistics for product {} in warehouse {}",
                statistics.product_id, statistics.warehouse_id
            ))),
        }
    }

    async fn add_receipt_to_statistics(
        &mut self,
        warehouse_id: WarehouseId,
        product_id: ProductId,
        quantity: Decimal,
    ) -> LedgerResult<WarehouseProductStatistics> {
        let key = (warehouse_id, product_id);
        let row = match self.working.statistics.get_mut(&key) {
            Some(row) => {
                row.receive(quantity)?;
                row.clone()
            }
            None => {
                let row = WarehouseProductStatistics::first_receipt(warehouse_id, product_id, quantity)?;
                self.working.statistics.insert(key, row.clone());
                row
            }
        };
        Ok(row)
    }

    async fn insert_lot(&mut self, receipt: &StockReceipt, at: DateTime<Utc>) -> LedgerResult<InventoryItem> {
        self.working.last_lot_id += 1;
        let lot = receipt
            .clone()
            .into_lot(InventoryItemId::new(self.working.last_lot_id), at);
        self.working.lots.insert(lot.id, lot.clone());
        Ok(lot)
    }

    async fn lock_lots_for_export(
        &mut self,
        warehouse_id: WarehouseId,
        product_id: ProductId,
    ) -> LedgerResult<Vec<LotBalance>> {
        Ok(self
            .working
            .lots
            .values()
            .filter(|l| l.warehouse_id == warehouse_id && l.product_id == product_id && !l.is_depleted())
            .map(InventoryItem::balance)
            .collect())
    }

    async fn deplete_lot(&mut self, lot_id: InventoryItemId, quantity: Decimal) -> LedgerResult<()> {
        let lot = self
            .working
            .lots
            .get_mut(&lot_id)
            .ok_or_else(|| LedgerError::not_found(format!("inventory item {lot_id}")))?;
        lot.deplete(quantity)?;
        Ok(())
    }

    async fn insert_item_detail(&mut self, detail: &InventoryItemDetail) -> LedgerResult<()> {
        if !self.working.lots.contains_key(&detail.inventory_item_id) {
            return Err(LedgerError::Validation(format!(
                "inventory item {} does not exist",
                detail.inventory_item_id
            )));
        }
        if !self
            .working
            .items
            .contains_key(&(detail.sale_order_id, detail.sale_order_seq))
        {
            return Err(LedgerError::Validation(format!(
                "sale order item {}/{} does not exist",
                detail.sale_order_id, detail.sale_order_seq
            )));
        }
        self.working.details.push(detail.clone());
        Ok(())
    }

    async fn insert_sale_order(
        &mut self,
        order: &NewSaleOrder,
        created_by: UserId,
        at: DateTime<Utc>,
    ) -> LedgerResult<SaleOrder> {
        self.working.last_sale_order_id += 1;
        let row = order.into_order(SaleOrderId::new(self.working.last_sale_order_id), created_by, at);
        self.working.orders.insert(row.id, row.clone());
        Ok(row)
    }

    async fn insert_sale_order_item(&mut self, item: &SaleOrderItem) -> LedgerResult<()> {
        if !self.working.orders.contains_key(&item.sale_order_id) {
            return Err(LedgerError::Validation(format!(
                "sale order {} does not exist",
                item.sale_order_id
            )));
        }
        if !self.working.prices.iter().any(|p| p.id == item.product_price_id) {
            return Err(LedgerError::Validation(format!(
                "product price {} does not exist",
                item.product_price_id
            )));
        }
        let key = (item.sale_order_id, item.sale_order_seq);
        if self.working.items.contains_key(&key) {
            return Err(LedgerError::Conflict(format!(
                "sale order item {}/{} already exists",
                item.sale_order_id, item.sale_order_seq
            )));
        }
        self.working.items.insert(key, item.clone());
        Ok(())
    }

    async fn lock_sale_order(&mut self, id: SaleOrderId) -> LedgerResult<Option<SaleOrder>> {
        Ok(self.working.orders.get(&id).cloned())
    }

    async fn lock_sale_order_item(
        &mut self,
        id: SaleOrderId,
        seq: i32,
    ) -> LedgerResult<Option<ExportLine>> {
        let Some(item) = self.working.items.get(&(id, seq)) else {
            return Ok(None);
        };
        let price = self
            .working
            .prices
            .iter()
            .find(|p| p.id == item.product_price_id)
            .ok_or_else(|| {
                LedgerError::data_integrity(format!(
                    "sale order item {id}/{seq} references missing price {}",
                    item.product_price_id
                ))
            })?;
        Ok(Some(ExportLine {
            item: item.clone(),
            product_id: price.product_id,
        }))
    }

    async fn mark_item_exported(&mut self, id: SaleOrderId, seq: i32) -> LedgerResult<()> {
        let item = self
            .working
            .items
            .get_mut(&(id, seq))
            .ok_or_else(|| LedgerError::not_found(format!("sale order item {id}/{seq}")))?;
        item.exported = true;
        Ok(())
    }

    async fn count_unexported_items(&mut self, id: SaleOrderId) -> LedgerResult<i64> {
        let count = self
            .working
            .items
            .range((id, i32::MIN)..=(id, i32::MAX))
            .filter(|(_, item)| !item.exported)
            .count();
        Ok(count as i64)
    }

    async fn update_sale_order_status(
        &mut self,
        id: SaleOrderId,
        expected: SaleOrderStatus,
        next: SaleOrderStatus,
        at: DateTime<Utc>,
    ) -> LedgerResult<u64> {
        match self.working.orders.get_mut(&id) {
            Some(order) if order.status == expected => {
                order.status = next;
                order.updated_at = at;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn commit(self) -> LedgerResult<()> {
        let InMemoryLedgerTx { mut guard, working } = self;
        *guard = working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depot_core::CustomerId;
    use depot_sales::OrderLine;

    fn receipt(warehouse_id: WarehouseId, product: i64, qty: i64) -> StockReceipt {
        StockReceipt {
            product_id: ProductId::new(product),
            warehouse_id,
            quantity: Decimal::new(qty, 0),
            unit_cost: Decimal::ONE,
            currency_uom_id: "USD".to_string(),
        }
    }

    #[tokio::test]
    async fn dropped_transaction_discards_its_writes() {
        let store = InMemoryLedgerStore::new();
        let warehouse_id = WarehouseId::new();

        {
            let mut tx = store.begin(Isolation::ReadCommitted).await.unwrap();
            tx.insert_lot(&receipt(warehouse_id, 1, 5), Utc::now()).await.unwrap();
            tx.add_receipt_to_statistics(warehouse_id, ProductId::new(1), Decimal::new(5, 0))
                .await
                .unwrap();
        }

        assert!(store.lots(warehouse_id, None).await.unwrap().is_empty());
        assert!(store.statistics(warehouse_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn committed_transaction_is_visible() {
        let store = InMemoryLedgerStore::new();
        let warehouse_id = WarehouseId::new();

        let mut tx = store.begin(Isolation::ReadCommitted).await.unwrap();
        let lot = tx.insert_lot(&receipt(warehouse_id, 1, 5), Utc::now()).await.unwrap();
        tx.commit().await.unwrap();

        let lots = store.lots(warehouse_id, None).await.unwrap();
        assert_eq!(lots, vec![lot]);
    }

    #[tokio::test]
    async fn lot_ids_increase_with_receipt_order() {
        let store = InMemoryLedgerStore::new();
        let warehouse_id = WarehouseId::new();

        let mut tx = store.begin(Isolation::ReadCommitted).await.unwrap();
        let first = tx.insert_lot(&receipt(warehouse_id, 1, 5), Utc::now()).await.unwrap();
        let second = tx.insert_lot(&receipt(warehouse_id, 1, 5), Utc::now()).await.unwrap();
        tx.commit().await.unwrap();

        assert!(first.id < second.id);
    }

    #[tokio::test]
    async fn status_update_is_conditional_on_expected_status() {
        let store = InMemoryLedgerStore::new();
        let order = NewSaleOrder {
            customer_id: CustomerId::new(),
            warehouse_id: WarehouseId::new(),
            lines: vec![OrderLine {
                product_id: ProductId::new(1),
                quantity: Decimal::ONE,
            }],
            ship_to_address: "Pier 4".to_string(),
            customer_store_id: None,
        };

        let mut tx = store.begin(Isolation::ReadCommitted).await.unwrap();
        let row = tx.insert_sale_order(&order, UserId::new(), Utc::now()).await.unwrap();

        let wrong = tx
            .update_sale_order_status(row.id, SaleOrderStatus::Accepted, SaleOrderStatus::Exported, Utc::now())
            .await
            .unwrap();
        let right = tx
            .update_sale_order_status(row.id, SaleOrderStatus::Pending, SaleOrderStatus::Accepted, Utc::now())
            .await
            .unwrap();

        assert_eq!(wrong, 0);
        assert_eq!(right, 1);
    }

    #[tokio::test]
    async fn statistics_update_rejects_out_of_order_counters() {
        let store = InMemoryLedgerStore::new();
        let warehouse_id = WarehouseId::new();

        let mut tx = store.begin(Isolation::ReadCommitted).await.unwrap();
        let mut row = tx
            .add_receipt_to_statistics(warehouse_id, ProductId::new(1), Decimal::new(5, 0))
            .await
            .unwrap();
        row.quantity_available = Decimal::new(6, 0);

        let err = tx.update_statistics(&row).await.unwrap_err();
        assert!(matches!(err, LedgerError::DataIntegrity(_)));
    }
}
