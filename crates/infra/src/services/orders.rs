//! Manual sale order transitions: accept, complete, cancel.
//!
//! Every transition locks the header, checks the transition table, then issues a
//! status update conditioned on the status it read. A disallowed transition is
//! `LedgerError::InvalidTransition`; an update that matched no row is
//! `LedgerError::Conflict`.
//!
//! Cancelling releases neither reservations nor stock.

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use depot_core::SaleOrderId;
use depot_sales::{SaleOrder, SaleOrderStatus};

use crate::ledger::{Isolation, LedgerError, LedgerResult, LedgerStore, LedgerTx};

#[derive(Debug, Clone)]
pub struct OrderLifecycle<S> {
    store: S,
}

impl<S: LedgerStore> OrderLifecycle<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn accept(&self, id: SaleOrderId, at: DateTime<Utc>) -> LedgerResult<SaleOrder> {
        self.transition(id, SaleOrderStatus::Accepted, at).await
    }

    /// Exported → completed.
    pub async fn complete(&self, id: SaleOrderId, at: DateTime<Utc>) -> LedgerResult<SaleOrder> {
        self.transition(id, SaleOrderStatus::Completed, at).await
    }

    pub async fn cancel(&self, id: SaleOrderId, at: DateTime<Utc>) -> LedgerResult<SaleOrder> {
        self.transition(id, SaleOrderStatus::Cancelled, at).await
    }

    #[instrument(skip(self), fields(sale_order_id = %id, to = %next), err)]
    async fn transition(
        &self,
        id: SaleOrderId,
        next: SaleOrderStatus,
        at: DateTime<Utc>,
    ) -> LedgerResult<SaleOrder> {
        let mut tx = self.store.begin(Isolation::ReadCommitted).await?;
        let mut order = tx
            .lock_sale_order(id)
            .await?
            .ok_or_else(|| LedgerError::not_found(format!("sale order {id}")))?;

        let from = order.status;
        order.transition(next, at).map_err(|_| LedgerError::InvalidTransition {
            sale_order_id: id,
            from,
            to: next,
        })?;

        let updated = tx.update_sale_order_status(id, from, next, at).await?;
        if updated == 0 {
            return Err(LedgerError::Conflict(format!(
                "sale order {id} is no longer {from}"
            )));
        }
        tx.commit().await?;

        info!(%from, "sale order status changed");
        Ok(order)
    }
}
