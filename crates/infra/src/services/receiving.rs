//! Stock receipt: one new lot per receipt plus the additive statistics upsert.

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use depot_inventory::{InventoryItem, StockReceipt, WarehouseProductStatistics};

use crate::ledger::{Isolation, LedgerResult, LedgerStore, LedgerTx};

#[derive(Debug, Clone)]
pub struct ReceiveStock {
    pub receipt: StockReceipt,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedStock {
    pub lot: InventoryItem,
    pub statistics: WarehouseProductStatistics,
}

#[derive(Debug, Clone)]
pub struct ReceivingService<S> {
    store: S,
}

impl<S: LedgerStore> ReceivingService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Record a receipt. The statistics row is written before the lot so that
    /// receipts take the same lock order as reservation and export.
    #[instrument(
        skip(self, cmd),
        fields(
            warehouse_id = %cmd.receipt.warehouse_id,
            product_id = %cmd.receipt.product_id,
            quantity = %cmd.receipt.quantity
        ),
        err
    )]
    pub async fn receive(&self, cmd: ReceiveStock) -> LedgerResult<ReceivedStock> {
        cmd.receipt.validate()?;

        let mut tx = self.store.begin(Isolation::ReadCommitted).await?;
        let statistics = tx
            .add_receipt_to_statistics(cmd.receipt.warehouse_id, cmd.receipt.product_id, cmd.receipt.quantity)
            .await?;
        let lot = tx.insert_lot(&cmd.receipt, cmd.received_at).await?;
        tx.commit().await?;

        info!(lot_id = %lot.id, "stock received");
        Ok(ReceivedStock { lot, statistics })
    }
}
