//! Export (shipment) of sale order lines with FIFO lot depletion.
//!
//! ```text
//! (sale_order_id, sale_order_seq)
//!   ↓
//! 1. Lock order header, then the line
//!      line already exported → AlreadyExported, nothing written
//!   ↓
//! 2. Lock statistics row, then lots with stock (ascending id)
//!   ↓
//! 3. Walk lots oldest first: one audit row per lot touched, deplete each lot
//!   ↓
//! 4. Move the reserved quantity out of on-hand, mark the line exported
//!   ↓
//! 5. Last unexported line done → order accepted ⇒ exported
//!   ↓
//! 6. Commit
//! ```
//!
//! Runs under `REPEATABLE READ`. A concurrent writer on the same rows surfaces as
//! `LedgerError::Transient` and the call may be repeated.

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use depot_core::{DomainError, SaleOrderId};
use depot_inventory::{InventoryItemDetail, allocate_fifo};
use depot_sales::SaleOrderStatus;

use crate::ledger::{Isolation, LedgerError, LedgerResult, LedgerStore, LedgerTx};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSaleOrderItem {
    pub sale_order_id: SaleOrderId,
    pub sale_order_seq: i32,
    /// Recorded on every audit row written by this export.
    pub effective_from: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Exported {
        details: Vec<InventoryItemDetail>,
        order_status: SaleOrderStatus,
    },
    /// The line was exported by an earlier call; the ledger is unchanged.
    AlreadyExported,
}

#[derive(Debug, Clone)]
pub struct FulfillmentService<S> {
    store: S,
}

impl<S: LedgerStore> FulfillmentService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[instrument(
        skip(self),
        fields(sale_order_id = %cmd.sale_order_id, sale_order_seq = cmd.sale_order_seq),
        err
    )]
    pub async fn export_item(&self, cmd: ExportSaleOrderItem) -> LedgerResult<ExportOutcome> {
        let ExportSaleOrderItem {
            sale_order_id,
            sale_order_seq,
            effective_from,
        } = cmd;

        let mut tx = self.store.begin(Isolation::RepeatableRead).await?;

        let order = tx
            .lock_sale_order(sale_order_id)
            .await?
            .ok_or_else(|| LedgerError::not_found(format!("sale order {sale_order_id}")))?;

        let line = tx
            .lock_sale_order_item(sale_order_id, sale_order_seq)
            .await?
            .ok_or_else(|| LedgerError::not_found(format!("sale order item {sale_order_id}/{sale_order_seq}")))?;

        if line.item.exported {
            debug!("line already exported");
            return Ok(ExportOutcome::AlreadyExported);
        }

        if !order.status.is_exportable() {
            return Err(LedgerError::InvalidTransition {
                sale_order_id,
                from: order.status,
                to: SaleOrderStatus::Exported,
            });
        }

        let warehouse_id = order.original_warehouse_id;
        let mut statistics = tx
            .lock_statistics(warehouse_id, line.product_id)
            .await?
            .ok_or_else(|| {
                LedgerError::data_integrity(format!(
                    "no statistics for reserved product {} in warehouse {warehouse_id}",
                    line.product_id
                ))
            })?;

        let lots = tx.lock_lots_for_export(warehouse_id, line.product_id).await?;
        let consumptions = allocate_fifo(&lots, line.item.quantity).map_err(|err| match err {
            DomainError::InsufficientStock { requested, available } => LedgerError::data_integrity(format!(
                "lots of product {} in warehouse {warehouse_id} hold {available}, line reserved {requested}",
                line.product_id
            )),
            other => other.into(),
        })?;

        let mut details = Vec::with_capacity(consumptions.len());
        for consumption in &consumptions {
            let detail =
                InventoryItemDetail::for_consumption(consumption, sale_order_id, sale_order_seq, effective_from);
            tx.insert_item_detail(&detail).await?;
            tx.deplete_lot(consumption.lot_id, consumption.quantity).await?;
            details.push(detail);
        }

        statistics.ship(line.item.quantity)?;
        tx.update_statistics(&statistics).await?;
        tx.mark_item_exported(sale_order_id, sale_order_seq).await?;

        let mut order_status = order.status;
        if tx.count_unexported_items(sale_order_id).await? == 0 {
            let updated = tx
                .update_sale_order_status(sale_order_id, order.status, SaleOrderStatus::Exported, effective_from)
                .await?;
            if updated == 0 {
                return Err(LedgerError::Conflict(format!(
                    "sale order {sale_order_id} changed status during export"
                )));
            }
            order_status = SaleOrderStatus::Exported;
        }

        tx.commit().await?;
        info!(lots = details.len(), status = %order_status, "sale order item exported");

        Ok(ExportOutcome::Exported { details, order_status })
    }
}
