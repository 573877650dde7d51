//! Read-only views over committed ledger state.

use tracing::instrument;

use depot_core::{ProductId, SaleOrderId, WarehouseId};
use depot_inventory::{InventoryItem, InventoryItemDetail, WarehouseProductStatistics};
use depot_sales::{SaleOrder, SaleOrderStatus};

use crate::ledger::{LedgerError, LedgerResult, LedgerStore, SaleOrderView};

#[derive(Debug, Clone)]
pub struct LedgerQueries<S> {
    store: S,
}

impl<S: LedgerStore> LedgerQueries<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[instrument(skip(self), fields(sale_order_id = %id), err)]
    pub async fn sale_order(&self, id: SaleOrderId) -> LedgerResult<SaleOrderView> {
        self.store
            .sale_order(id)
            .await?
            .ok_or_else(|| LedgerError::not_found(format!("sale order {id}")))
    }

    /// Orders still in the export stage: accepted ones with lines left to
    /// export and fully exported ones waiting to be completed.
    pub async fn exportable_orders(&self) -> LedgerResult<Vec<SaleOrder>> {
        self.store
            .sale_orders_by_status(&[SaleOrderStatus::Accepted, SaleOrderStatus::Exported])
            .await
    }

    pub async fn completed_orders(&self) -> LedgerResult<Vec<SaleOrder>> {
        self.store.sale_orders_by_status(&[SaleOrderStatus::Completed]).await
    }

    pub async fn lots(
        &self,
        warehouse_id: WarehouseId,
        product_id: Option<ProductId>,
    ) -> LedgerResult<Vec<InventoryItem>> {
        self.store.lots(warehouse_id, product_id).await
    }

    pub async fn statistics(&self, warehouse_id: WarehouseId) -> LedgerResult<Vec<WarehouseProductStatistics>> {
        self.store.statistics(warehouse_id).await
    }

    /// Audit rows of an order; the order itself must exist.
    #[instrument(skip(self), fields(sale_order_id = %id), err)]
    pub async fn export_details(&self, id: SaleOrderId) -> LedgerResult<Vec<InventoryItemDetail>> {
        if self.store.sale_order(id).await?.is_none() {
            return Err(LedgerError::not_found(format!("sale order {id}")));
        }
        self.store.export_details(id).await
    }
}
