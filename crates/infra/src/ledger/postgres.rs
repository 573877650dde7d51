//! Postgres-backed ledger store.
//!
//! Every ledger operation runs in one SQL transaction. Cross-request correctness
//! comes from row locks, not from anything held in process:
//!
//! - the `warehouse_product_statistics` row is read with `SELECT ... FOR UPDATE`
//!   (reservation, export) or written with an additive `INSERT ... ON CONFLICT DO
//!   UPDATE` (receipt), so all three writers serialize on it;
//! - lots are locked `FOR UPDATE` in ascending id order, after the statistics row;
//! - sale order headers and lines are locked `FOR UPDATE` before status or
//!   `exported` changes;
//! - price history writes of one product serialize on a transaction-scoped
//!   advisory lock keyed by the product id.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `LedgerError` as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | LedgerError | Scenario |
//! |------------|----------------------|-------------|----------|
//! | Database (unique violation) | `23505` | `Conflict` | Duplicate key |
//! | Database (foreign key violation) | `23503` | `Validation` | Referenced order, line, lot or price does not exist |
//! | Database (check constraint violation) | `23514` | `DataIntegrity` | Counter ordering or non-negative quantity broken |
//! | Database (serialization failure) | `40001` | `Transient` | Concurrent update under `REPEATABLE READ` |
//! | Database (deadlock detected) | `40P01` | `Transient` | Two writers locked rows in opposite order |
//! | Database (other) | Any other | `Store` | Other database errors |
//! | PoolTimedOut / PoolClosed / Io | N/A | `Transient` | Connection unavailable |
//! | RowNotFound | N/A | `NotFound` | Unexpected row not found |
//! | Other | N/A | `Store` | Decode errors, protocol errors, etc. |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::instrument;
use uuid::Uuid;

use depot_core::{
    CustomerId, FacilityId, InventoryItemDetailId, InventoryItemId, ProductId, ProductPriceId, SaleOrderId,
    UserId, WarehouseId,
};
use depot_inventory::{InventoryItem, InventoryItemDetail, LotBalance, StockReceipt, WarehouseProductStatistics};
use depot_products::{EffectivePrice, ProductPrice};
use depot_sales::{NewSaleOrder, SaleOrder, SaleOrderItem, SaleOrderStatus};

use super::error::{LedgerError, LedgerResult};
use super::store::{ExportLine, Isolation, LedgerStore, LedgerTx, SaleOrderLineView, SaleOrderView};

const SALE_ORDER_COLUMNS: &str = "id, customer_id, original_warehouse_id, created_by_user_login_id, \
     ship_to_address, ship_to_facility_customer_id, sale_order_status_id, created_at, updated_at";

const INVENTORY_ITEM_COLUMNS: &str =
    "id, product_id, warehouse_id, quantity, quantity_on_hand, unit_cost, currency_uom_id, created_at";

const STATISTICS_COLUMNS: &str =
    "warehouse_id, product_id, inventory_item_count, quantity_total, quantity_on_hand, quantity_available";

/// Postgres-backed ledger store.
///
/// `Send + Sync`; the SQLx pool handles connection sharing.
#[derive(Debug, Clone)]
pub struct PostgresLedgerStore {
    pool: Arc<PgPool>,
}

impl PostgresLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// One open Postgres transaction. Dropping it without `commit` rolls back.
pub struct PgLedgerTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    type Tx = PgLedgerTx;

    #[instrument(skip(self), err)]
    async fn begin(&self, isolation: Isolation) -> LedgerResult<Self::Tx> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        if isolation == Isolation::RepeatableRead {
            sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("set_isolation", e))?;
        }

        Ok(PgLedgerTx { tx })
    }

    #[instrument(skip(self), fields(sale_order_id = %id), err)]
    async fn sale_order(&self, id: SaleOrderId) -> LedgerResult<Option<SaleOrderView>> {
        let row = sqlx::query(&format!("SELECT {SALE_ORDER_COLUMNS} FROM sale_order WHERE id = $1"))
            .bind(id.value())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("sale_order", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let order = sale_order_from_row(&row)?;

        let item_rows = sqlx::query(
            r#"
            SELECT
                i.sale_order_seq,
                p.product_id,
                i.product_price_id,
                p.price,
                p.currency_uom_id,
                i.quantity,
                i.exported
            FROM sale_order_item i
            INNER JOIN product_price p ON p.id = i.product_price_id
            WHERE i.sale_order_id = $1
            ORDER BY i.sale_order_seq ASC
            "#,
        )
        .bind(id.value())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("sale_order_items", e))?;

        let mut items = Vec::with_capacity(item_rows.len());
        for row in item_rows {
            items.push(SaleOrderLineView {
                sale_order_seq: row.try_get("sale_order_seq").map_err(decode_error)?,
                product_id: ProductId::new(row.try_get("product_id").map_err(decode_error)?),
                product_price_id: ProductPriceId::from_uuid(row.try_get("product_price_id").map_err(decode_error)?),
                price: row.try_get("price").map_err(decode_error)?,
                currency_uom_id: row.try_get("currency_uom_id").map_err(decode_error)?,
                quantity: row.try_get("quantity").map_err(decode_error)?,
                exported: row.try_get("exported").map_err(decode_error)?,
            });
        }

        Ok(Some(SaleOrderView { order, items }))
    }

    #[instrument(skip(self), err)]
    async fn sale_orders_by_status(&self, statuses: &[SaleOrderStatus]) -> LedgerResult<Vec<SaleOrder>> {
        let ids: Vec<i16> = statuses.iter().map(|s| s.id()).collect();
        let rows = sqlx::query(&format!(
            "SELECT {SALE_ORDER_COLUMNS} FROM sale_order WHERE sale_order_status_id = ANY($1) ORDER BY id ASC"
        ))
        .bind(&ids)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("sale_orders_by_status", e))?;

        rows.iter().map(sale_order_from_row).collect()
    }

    #[instrument(skip(self), fields(warehouse_id = %warehouse_id), err)]
    async fn lots(
        &self,
        warehouse_id: WarehouseId,
        product_id: Option<ProductId>,
    ) -> LedgerResult<Vec<InventoryItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {INVENTORY_ITEM_COLUMNS} FROM inventory_item \
             WHERE warehouse_id = $1 AND ($2::BIGINT IS NULL OR product_id = $2) \
             ORDER BY id ASC"
        ))
        .bind(warehouse_id.as_uuid())
        .bind(product_id.map(|p| p.value()))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("lots", e))?;

        rows.iter().map(inventory_item_from_row).collect()
    }

    #[instrument(skip(self), fields(warehouse_id = %warehouse_id), err)]
    async fn statistics(&self, warehouse_id: WarehouseId) -> LedgerResult<Vec<WarehouseProductStatistics>> {
        let rows = sqlx::query(&format!(
            "SELECT {STATISTICS_COLUMNS} FROM warehouse_product_statistics \
             WHERE warehouse_id = $1 ORDER BY product_id ASC"
        ))
        .bind(warehouse_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("statistics", e))?;

        rows.iter().map(statistics_from_row).collect()
    }

    #[instrument(skip(self), fields(sale_order_id = %sale_order_id), err)]
    async fn export_details(&self, sale_order_id: SaleOrderId) -> LedgerResult<Vec<InventoryItemDetail>> {
        // Lots are consumed in ascending id order, so that order reproduces the walk.
        let rows = sqlx::query(
            r#"
            SELECT id, inventory_item_id, exported_quantity, effective_from, sale_order_id, sale_order_seq
            FROM inventory_item_detail
            WHERE sale_order_id = $1
            ORDER BY sale_order_seq ASC, inventory_item_id ASC
            "#,
        )
        .bind(sale_order_id.value())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("export_details", e))?;

        rows.iter().map(detail_from_row).collect()
    }

    #[instrument(skip(self), fields(product_id = %product_id), err)]
    async fn effective_price(
        &self,
        product_id: ProductId,
        at: DateTime<Utc>,
    ) -> LedgerResult<Option<EffectivePrice>> {
        let row = sqlx::query(EFFECTIVE_PRICE_SQL)
            .bind(product_id.value())
            .bind(at)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("effective_price", e))?;

        row.as_ref().map(effective_price_from_row).transpose()
    }
}

const EFFECTIVE_PRICE_SQL: &str = r#"
    SELECT id, price, currency_uom_id
    FROM product_price
    WHERE product_id = $1
      AND effective_from <= $2
      AND (expired_at IS NULL OR $2 < expired_at)
    ORDER BY effective_from DESC
    LIMIT 1
"#;

#[async_trait]
impl LedgerTx for PgLedgerTx {
    async fn effective_price(
        &mut self,
        product_id: ProductId,
        at: DateTime<Utc>,
    ) -> LedgerResult<Option<EffectivePrice>> {
        let row = sqlx::query(EFFECTIVE_PRICE_SQL)
            .bind(product_id.value())
            .bind(at)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("effective_price", e))?;

        row.as_ref().map(effective_price_from_row).transpose()
    }

    async fn close_superseded_prices(
        &mut self,
        product_id: ProductId,
        effective_from: DateTime<Utc>,
    ) -> LedgerResult<u64> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(product_id.value())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("lock_price_history", e))?;

        let result = sqlx::query(
            r#"
            UPDATE product_price
            SET expired_at = GREATEST(effective_from, $2)
            WHERE product_id = $1
              AND (expired_at IS NULL OR $2 < expired_at)
            "#,
        )
        .bind(product_id.value())
        .bind(effective_from)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("close_superseded_prices", e))?;

        Ok(result.rows_affected())
    }

    async fn insert_price(&mut self, price: &ProductPrice) -> LedgerResult<()> {
        sqlx::query(
            r#"
            INSERT INTO product_price (
                id,
                product_id,
                price,
                currency_uom_id,
                created_by_user_login_id,
                effective_from,
                expired_at,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(price.id.as_uuid())
        .bind(price.product_id.value())
        .bind(price.price)
        .bind(&price.currency_uom_id)
        .bind(price.created_by.as_uuid())
        .bind(price.effective_from)
        .bind(price.expired_at)
        .bind(price.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert_price", e))?;

        Ok(())
    }

    async fn lock_statistics(
        &mut self,
        warehouse_id: WarehouseId,
        product_id: ProductId,
    ) -> LedgerResult<Option<WarehouseProductStatistics>> {
        let row = sqlx::query(&format!(
            "SELECT {STATISTICS_COLUMNS} FROM warehouse_product_statistics \
             WHERE warehouse_id = $1 AND product_id = $2 \
             FOR UPDATE"
        ))
        .bind(warehouse_id.as_uuid())
        .bind(product_id.value())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("lock_statistics", e))?;

        row.as_ref().map(statistics_from_row).transpose()
    }

    async fn update_statistics(&mut self, statistics: &WarehouseProductStatistics) -> LedgerResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE warehouse_product_statistics
            SET inventory_item_count = $3,
                quantity_total = $4,
                quantity_on_hand = $5,
                quantity_available = $6
            WHERE warehouse_id = $1 AND product_id = $2
            "#,
        )
        .bind(statistics.warehouse_id.as_uuid())
        .bind(statistics.product_id.value())
        .bind(statistics.inventory_item_count)
        .bind(statistics.quantity_total)
        .bind(statistics.quantity_on_hand)
        .bind(statistics.quantity_available)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("update_statistics", e))?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::not_found(format!(
                "statistics for product {} in warehouse {}",
                statistics.product_id, statistics.warehouse_id
            )));
        }
        Ok(())
    }

    async fn add_receipt_to_statistics(
        &mut self,
        warehouse_id: WarehouseId,
        product_id: ProductId,
        quantity: Decimal,
    ) -> LedgerResult<WarehouseProductStatistics> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO warehouse_product_statistics (
                warehouse_id,
                product_id,
                inventory_item_count,
                quantity_total,
                quantity_on_hand,
                quantity_available
            )
            VALUES ($1, $2, 1, $3, $3, $3)
            ON CONFLICT (warehouse_id, product_id)
            DO UPDATE SET
                inventory_item_count = warehouse_product_statistics.inventory_item_count + 1,
                quantity_total = warehouse_product_statistics.quantity_total + EXCLUDED.quantity_total,
                quantity_on_hand = warehouse_product_statistics.quantity_on_hand + EXCLUDED.quantity_on_hand,
                quantity_available = warehouse_product_statistics.quantity_available + EXCLUDED.quantity_available
            RETURNING {STATISTICS_COLUMNS}
            "#
        ))
        .bind(warehouse_id.as_uuid())
        .bind(product_id.value())
        .bind(quantity)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("add_receipt_to_statistics", e))?;

        statistics_from_row(&row)
    }

    async fn insert_lot(&mut self, receipt: &StockReceipt, at: DateTime<Utc>) -> LedgerResult<InventoryItem> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO inventory_item (
                product_id,
                warehouse_id,
                quantity,
                quantity_on_hand,
                unit_cost,
                currency_uom_id,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $3, $4, $5, $6, $6)
            RETURNING {INVENTORY_ITEM_COLUMNS}
            "#
        ))
        .bind(receipt.product_id.value())
        .bind(receipt.warehouse_id.as_uuid())
        .bind(receipt.quantity)
        .bind(receipt.unit_cost)
        .bind(&receipt.currency_uom_id)
        .bind(at)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert_lot", e))?;

        inventory_item_from_row(&row)
    }

    async fn lock_lots_for_export(
        &mut self,
        warehouse_id: WarehouseId,
        product_id: ProductId,
    ) -> LedgerResult<Vec<LotBalance>> {
        let rows = sqlx::query(
            r#"
            SELECT id, quantity_on_hand
            FROM inventory_item
            WHERE warehouse_id = $1 AND product_id = $2 AND quantity_on_hand > 0
            ORDER BY id ASC
            FOR UPDATE
            "#,
        )
        .bind(warehouse_id.as_uuid())
        .bind(product_id.value())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("lock_lots_for_export", e))?;

        rows.iter()
            .map(|row| {
                Ok(LotBalance {
                    lot_id: InventoryItemId::new(row.try_get("id").map_err(decode_error)?),
                    quantity_on_hand: row.try_get("quantity_on_hand").map_err(decode_error)?,
                })
            })
            .collect()
    }

    async fn deplete_lot(&mut self, lot_id: InventoryItemId, quantity: Decimal) -> LedgerResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE inventory_item
            SET quantity_on_hand = quantity_on_hand - $2,
                updated_at = NOW()
            WHERE id = $1 AND quantity_on_hand >= $2
            "#,
        )
        .bind(lot_id.value())
        .bind(quantity)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("deplete_lot", e))?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::data_integrity(format!(
                "lot {lot_id} cannot be depleted by {quantity}"
            )));
        }
        Ok(())
    }

    async fn insert_item_detail(&mut self, detail: &InventoryItemDetail) -> LedgerResult<()> {
        sqlx::query(
            r#"
            INSERT INTO inventory_item_detail (
                id,
                inventory_item_id,
                exported_quantity,
                effective_from,
                sale_order_id,
                sale_order_seq
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(detail.id.as_uuid())
        .bind(detail.inventory_item_id.value())
        .bind(detail.exported_quantity)
        .bind(detail.effective_from)
        .bind(detail.sale_order_id.value())
        .bind(detail.sale_order_seq)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert_item_detail", e))?;

        Ok(())
    }

    async fn insert_sale_order(
        &mut self,
        order: &NewSaleOrder,
        created_by: UserId,
        at: DateTime<Utc>,
    ) -> LedgerResult<SaleOrder> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO sale_order (
                customer_id,
                original_warehouse_id,
                created_by_user_login_id,
                ship_to_address,
                ship_to_facility_customer_id,
                sale_order_status_id,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING {SALE_ORDER_COLUMNS}
            "#
        ))
        .bind(order.customer_id.as_uuid())
        .bind(order.warehouse_id.as_uuid())
        .bind(created_by.as_uuid())
        .bind(&order.ship_to_address)
        .bind(order.customer_store_id.map(Uuid::from))
        .bind(SaleOrderStatus::Pending.id())
        .bind(at)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert_sale_order", e))?;

        sale_order_from_row(&row)
    }

    async fn insert_sale_order_item(&mut self, item: &SaleOrderItem) -> LedgerResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sale_order_item (
                sale_order_id,
                sale_order_seq,
                product_price_id,
                quantity,
                exported
            )
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(item.sale_order_id.value())
        .bind(item.sale_order_seq)
        .bind(item.product_price_id.as_uuid())
        .bind(item.quantity)
        .bind(item.exported)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert_sale_order_item", e))?;

        Ok(())
    }

    async fn lock_sale_order(&mut self, id: SaleOrderId) -> LedgerResult<Option<SaleOrder>> {
        let row = sqlx::query(&format!(
            "SELECT {SALE_ORDER_COLUMNS} FROM sale_order WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.value())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("lock_sale_order", e))?;

        row.as_ref().map(sale_order_from_row).transpose()
    }

    async fn lock_sale_order_item(
        &mut self,
        id: SaleOrderId,
        seq: i32,
    ) -> LedgerResult<Option<ExportLine>> {
        let row = sqlx::query(
            r#"
            SELECT
                i.sale_order_id,
                i.sale_order_seq,
                i.product_price_id,
                i.quantity,
                i.exported,
                p.product_id
            FROM sale_order_item i
            INNER JOIN product_price p ON p.id = i.product_price_id
            WHERE i.sale_order_id = $1 AND i.sale_order_seq = $2
            FOR UPDATE OF i
            "#,
        )
        .bind(id.value())
        .bind(seq)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("lock_sale_order_item", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(ExportLine {
            item: SaleOrderItem {
                sale_order_id: SaleOrderId::new(row.try_get("sale_order_id").map_err(decode_error)?),
                sale_order_seq: row.try_get("sale_order_seq").map_err(decode_error)?,
                product_price_id: ProductPriceId::from_uuid(row.try_get("product_price_id").map_err(decode_error)?),
                quantity: row.try_get("quantity").map_err(decode_error)?,
                exported: row.try_get("exported").map_err(decode_error)?,
            },
            product_id: ProductId::new(row.try_get("product_id").map_err(decode_error)?),
        }))
    }

    async fn mark_item_exported(&mut self, id: SaleOrderId, seq: i32) -> LedgerResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE sale_order_item
            SET exported = TRUE
            WHERE sale_order_id = $1 AND sale_order_seq = $2 AND exported = FALSE
            "#,
        )
        .bind(id.value())
        .bind(seq)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("mark_item_exported", e))?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::Conflict(format!(
                "sale order item {id}/{seq} was exported concurrently"
            )));
        }
        Ok(())
    }

    async fn count_unexported_items(&mut self, id: SaleOrderId) -> LedgerResult<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS remaining FROM sale_order_item WHERE sale_order_id = $1 AND exported = FALSE",
        )
        .bind(id.value())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("count_unexported_items", e))?;

        row.try_get("remaining").map_err(decode_error)
    }

    async fn update_sale_order_status(
        &mut self,
        id: SaleOrderId,
        expected: SaleOrderStatus,
        next: SaleOrderStatus,
        at: DateTime<Utc>,
    ) -> LedgerResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE sale_order
            SET sale_order_status_id = $3,
                updated_at = $4
            WHERE id = $1 AND sale_order_status_id = $2
            "#,
        )
        .bind(id.value())
        .bind(expected.id())
        .bind(next.id())
        .bind(at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("update_sale_order_status", e))?;

        Ok(result.rows_affected())
    }

    async fn commit(self) -> LedgerResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))
    }
}

fn sale_order_from_row(row: &PgRow) -> LedgerResult<SaleOrder> {
    let status_id: i16 = row.try_get("sale_order_status_id").map_err(decode_error)?;
    let facility: Option<Uuid> = row.try_get("ship_to_facility_customer_id").map_err(decode_error)?;

    Ok(SaleOrder {
        id: SaleOrderId::new(row.try_get("id").map_err(decode_error)?),
        customer_id: CustomerId::from_uuid(row.try_get("customer_id").map_err(decode_error)?),
        original_warehouse_id: WarehouseId::from_uuid(row.try_get("original_warehouse_id").map_err(decode_error)?),
        created_by: UserId::from_uuid(row.try_get("created_by_user_login_id").map_err(decode_error)?),
        ship_to_address: row.try_get("ship_to_address").map_err(decode_error)?,
        ship_to_facility_customer_id: facility.map(FacilityId::from_uuid),
        status: SaleOrderStatus::from_id(status_id)?,
        created_at: row.try_get("created_at").map_err(decode_error)?,
        updated_at: row.try_get("updated_at").map_err(decode_error)?,
    })
}

fn inventory_item_from_row(row: &PgRow) -> LedgerResult<InventoryItem> {
    Ok(InventoryItem {
        id: InventoryItemId::new(row.try_get("id").map_err(decode_error)?),
        product_id: ProductId::new(row.try_get("product_id").map_err(decode_error)?),
        warehouse_id: WarehouseId::from_uuid(row.try_get("warehouse_id").map_err(decode_error)?),
        quantity: row.try_get("quantity").map_err(decode_error)?,
        quantity_on_hand: row.try_get("quantity_on_hand").map_err(decode_error)?,
        unit_cost: row.try_get("unit_cost").map_err(decode_error)?,
        currency_uom_id: row.try_get("currency_uom_id").map_err(decode_error)?,
        created_at: row.try_get("created_at").map_err(decode_error)?,
    })
}

fn statistics_from_row(row: &PgRow) -> LedgerResult<WarehouseProductStatistics> {
    Ok(WarehouseProductStatistics {
        warehouse_id: WarehouseId::from_uuid(row.try_get("warehouse_id").map_err(decode_error)?),
        product_id: ProductId::new(row.try_get("product_id").map_err(decode_error)?),
        inventory_item_count: row.try_get("inventory_item_count").map_err(decode_error)?,
        quantity_total: row.try_get("quantity_total").map_err(decode_error)?,
        quantity_on_hand: row.try_get("quantity_on_hand").map_err(decode_error)?,
        quantity_available: row.try_get("quantity_available").map_err(decode_error)?,
    })
}

fn detail_from_row(row: &PgRow) -> LedgerResult<InventoryItemDetail> {
    Ok(InventoryItemDetail {
        id: InventoryItemDetailId::from_uuid(row.try_get("id").map_err(decode_error)?),
        inventory_item_id: InventoryItemId::new(row.try_get("inventory_item_id").map_err(decode_error)?),
        exported_quantity: row.try_get("exported_quantity").map_err(decode_error)?,
        effective_from: row.try_get("effective_from").map_err(decode_error)?,
        sale_order_id: SaleOrderId::new(row.try_get("sale_order_id").map_err(decode_error)?),
        sale_order_seq: row.try_get("sale_order_seq").map_err(decode_error)?,
    })
}

fn effective_price_from_row(row: &PgRow) -> LedgerResult<EffectivePrice> {
    Ok(EffectivePrice {
        price_id: ProductPriceId::from_uuid(row.try_get("id").map_err(decode_error)?),
        price: row.try_get("price").map_err(decode_error)?,
        currency_uom_id: row.try_get("currency_uom_id").map_err(decode_error)?,
    })
}

fn decode_error(err: sqlx::Error) -> LedgerError {
    LedgerError::Store(format!("failed to decode row: {err}"))
}

/// Map SQLx errors to `LedgerError`; see the module-level table.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> LedgerError {
    let mapped = match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => LedgerError::Conflict(msg),
                Some("23503") => LedgerError::Validation(msg),
                Some("23514") => LedgerError::DataIntegrity(msg),
                Some("40001") | Some("40P01") => LedgerError::Transient(msg),
                _ => LedgerError::Store(msg),
            }
        }
        sqlx::Error::PoolTimedOut => {
            LedgerError::Transient(format!("connection pool timed out in {}", operation))
        }
        sqlx::Error::PoolClosed => {
            LedgerError::Transient(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::Io(e) => LedgerError::Transient(format!("i/o error in {}: {}", operation, e)),
        sqlx::Error::RowNotFound => {
            LedgerError::NotFound(format!("unexpected row not found in {}", operation))
        }
        other => LedgerError::Store(format!("sqlx error in {}: {}", operation, other)),
    };

    if matches!(mapped, LedgerError::Store(_)) {
        tracing::error!(operation, error = %mapped, "ledger storage error");
    }
    mapped
}
