//! Order placement with reservation.
//!
//! ```text
//! NewSaleOrder
//!   ↓
//! 1. Validate lines (nothing written on failure)
//!   ↓
//! 2. Insert the order header (status pending)
//!   ↓
//! 3. For each line, in input order:
//!      resolve effective price → lock statistics row → reserve → insert line
//!   ↓
//! 4. Commit
//! ```
//!
//! Any failure drops the open transaction, so no line of the order stays reserved.
//! Statistics rows are locked in input order; two orders naming the same products in
//! opposite order can deadlock, which surfaces as `LedgerError::Transient`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{Span, info, instrument, warn};

use depot_core::{DomainError, UserId};
use depot_sales::{NewSaleOrder, SaleOrder, SaleOrderItem};

use crate::ledger::{Isolation, LedgerError, LedgerResult, LedgerStore, LedgerTx};

/// Place an order on behalf of `actor`.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub order: NewSaleOrder,
    pub actor: UserId,
    pub placed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub order: SaleOrder,
    pub items: Vec<SaleOrderItem>,
}

#[derive(Debug, Clone)]
pub struct ReservationService<S> {
    store: S,
}

impl<S: LedgerStore> ReservationService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Create the order and reserve every line, or nothing.
    #[instrument(
        skip(self, cmd),
        fields(
            warehouse_id = %cmd.order.warehouse_id,
            lines = cmd.order.lines.len(),
            sale_order_id = tracing::field::Empty
        ),
        err
    )]
    pub async fn place_order(&self, cmd: PlaceOrder) -> LedgerResult<PlacedOrder> {
        cmd.order.validate()?;

        let mut tx = self.store.begin(Isolation::ReadCommitted).await?;
        let order = tx.insert_sale_order(&cmd.order, cmd.actor, cmd.placed_at).await?;
        Span::current().record("sale_order_id", tracing::field::display(order.id));

        let mut items = Vec::with_capacity(cmd.order.lines.len());
        for (seq, line) in cmd.order.lines.iter().enumerate() {
            let seq = i32::try_from(seq)
                .map_err(|_| LedgerError::Validation("order has too many lines".to_string()))?;

            let Some(price) = tx.effective_price(line.product_id, cmd.placed_at).await? else {
                warn!(product_id = %line.product_id, "no effective price");
                return Err(LedgerError::PriceNotFound(line.product_id));
            };

            let Some(mut statistics) = tx.lock_statistics(cmd.order.warehouse_id, line.product_id).await? else {
                warn!(product_id = %line.product_id, "product has no stock in warehouse");
                return Err(LedgerError::Oversell {
                    product_id: line.product_id,
                    requested: line.quantity,
                    available: Decimal::ZERO,
                });
            };

            statistics.reserve(line.quantity).map_err(|err| match err {
                DomainError::InsufficientStock { requested, available } => {
                    warn!(product_id = %line.product_id, %requested, %available, "oversell rejected");
                    LedgerError::Oversell {
                        product_id: line.product_id,
                        requested,
                        available,
                    }
                }
                other => other.into(),
            })?;
            tx.update_statistics(&statistics).await?;

            let item = SaleOrderItem::new(order.id, seq, price.price_id, line.quantity);
            tx.insert_sale_order_item(&item).await?;
            items.push(item);
        }

        tx.commit().await?;
        info!(sale_order_id = %order.id, "sale order placed");

        Ok(PlacedOrder { order, items })
    }
}
