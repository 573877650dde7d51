//! Ledger backend selection and the request-facing service facade.

use chrono::{DateTime, Utc};

use depot_core::{ProductId, SaleOrderId, UserId, WarehouseId};
use depot_infra::config::AppConfig;
use depot_infra::db;
use depot_infra::ledger::{InMemoryLedgerStore, LedgerResult, PostgresLedgerStore, SaleOrderView};
use depot_infra::services::{
    ExportOutcome, ExportSaleOrderItem, LedgerServices, PlaceOrder, PlacedOrder, ReceiveStock, ReceivedStock,
};
use depot_inventory::{InventoryItem, InventoryItemDetail, WarehouseProductStatistics};
use depot_products::{EffectivePrice, NewProductPrice, ProductPrice};
use depot_sales::SaleOrder;

#[derive(Clone)]
pub enum AppServices {
    InMemory(LedgerServices<InMemoryLedgerStore>),
    Postgres(LedgerServices<PostgresLedgerStore>),
}

/// Forward a call to whichever backend is active.
macro_rules! with_backend {
    ($self:ident, $svc:ident => $call:expr) => {
        match $self {
            AppServices::InMemory($svc) => $call,
            AppServices::Postgres($svc) => $call,
        }
    };
}

pub async fn build_services(config: &AppConfig) -> LedgerResult<AppServices> {
    if !config.use_persistent_stores {
        tracing::info!("using in-memory ledger store");
        return Ok(AppServices::InMemory(LedgerServices::new(InMemoryLedgerStore::new())));
    }

    let pool = db::connect(config).await?;
    if config.run_migrations {
        db::migrate(&pool).await?;
    }
    tracing::info!("using Postgres ledger store");
    Ok(AppServices::Postgres(LedgerServices::new(PostgresLedgerStore::new(pool))))
}

impl AppServices {
    pub fn in_memory() -> Self {
        AppServices::InMemory(LedgerServices::new(InMemoryLedgerStore::new()))
    }

    pub fn backend(&self) -> &'static str {
        match self {
            AppServices::InMemory(_) => "in_memory",
            AppServices::Postgres(_) => "postgres",
        }
    }

    pub async fn place_order(&self, cmd: PlaceOrder) -> LedgerResult<PlacedOrder> {
        with_backend!(self, s => s.reservation.place_order(cmd).await)
    }

    pub async fn accept_order(&self, id: SaleOrderId, at: DateTime<Utc>) -> LedgerResult<SaleOrder> {
        with_backend!(self, s => s.orders.accept(id, at).await)
    }

    pub async fn cancel_order(&self, id: SaleOrderId, at: DateTime<Utc>) -> LedgerResult<SaleOrder> {
        with_backend!(self, s => s.orders.cancel(id, at).await)
    }

    pub async fn complete_order(&self, id: SaleOrderId, at: DateTime<Utc>) -> LedgerResult<SaleOrder> {
        with_backend!(self, s => s.orders.complete(id, at).await)
    }

    pub async fn export_item(&self, cmd: ExportSaleOrderItem) -> LedgerResult<ExportOutcome> {
        with_backend!(self, s => s.fulfillment.export_item(cmd).await)
    }

    pub async fn receive_stock(&self, cmd: ReceiveStock) -> LedgerResult<ReceivedStock> {
        with_backend!(self, s => s.receiving.receive(cmd).await)
    }

    pub async fn set_price(
        &self,
        input: NewProductPrice,
        actor: UserId,
        at: DateTime<Utc>,
    ) -> LedgerResult<ProductPrice> {
        with_backend!(self, s => s.pricing.set_price(input, actor, at).await)
    }

    pub async fn effective_price(
        &self,
        product_id: ProductId,
        at: DateTime<Utc>,
    ) -> LedgerResult<Option<EffectivePrice>> {
        with_backend!(self, s => s.pricing.effective_price(product_id, at).await)
    }

    pub async fn sale_order(&self, id: SaleOrderId) -> LedgerResult<SaleOrderView> {
        with_backend!(self, s => s.queries.sale_order(id).await)
    }

    pub async fn exportable_orders(&self) -> LedgerResult<Vec<SaleOrder>> {
        with_backend!(self, s => s.queries.exportable_orders().await)
    }

    pub async fn completed_orders(&self) -> LedgerResult<Vec<SaleOrder>> {
        with_backend!(self, s => s.queries.completed_orders().await)
    }

    pub async fn lots(
        &self,
        warehouse_id: WarehouseId,
        product_id: Option<ProductId>,
    ) -> LedgerResult<Vec<InventoryItem>> {
        with_backend!(self, s => s.queries.lots(warehouse_id, product_id).await)
    }

    pub async fn statistics(&self, warehouse_id: WarehouseId) -> LedgerResult<Vec<WarehouseProductStatistics>> {
        with_backend!(self, s => s.queries.statistics(warehouse_id).await)
    }

    pub async fn export_details(&self, id: SaleOrderId) -> LedgerResult<Vec<InventoryItemDetail>> {
        with_backend!(self, s => s.queries.export_details(id).await)
    }
}
