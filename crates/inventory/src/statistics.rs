use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use depot_core::{DomainError, DomainResult, ProductId, WarehouseId, ensure_positive};

/// Denormalized stock counters for one (warehouse, product).
///
/// Invariant: `0 <= quantity_available <= quantity_on_hand <= quantity_total`.
/// `quantity_on_hand` equals the sum of the key's lot balances.
///
/// Receipts raise all three counters, reservations lower `quantity_available`,
/// exports lower `quantity_on_hand`. Storage serializes every writer on this row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseProductStatistics {
    pub warehouse_id: WarehouseId,
    pub product_id: ProductId,
    pub inventory_item_count: i64,
    pub quantity_total: Decimal,
    pub quantity_on_hand: Decimal,
    pub quantity_available: Decimal,
}

impl WarehouseProductStatistics {
    /// Counters for a key whose first lot was just received.
    pub fn first_receipt(
        warehouse_id: WarehouseId,
        product_id: ProductId,
        quantity: Decimal,
    ) -> DomainResult<Self> {
        ensure_positive(quantity, "received quantity")?;
        Ok(Self {
            warehouse_id,
            product_id,
            inventory_item_count: 1,
            quantity_total: quantity,
            quantity_on_hand: quantity,
            quantity_available: quantity,
        })
    }

    /// Apply another lot's receipt (pure addition).
    pub fn receive(&mut self, quantity: Decimal) -> DomainResult<()> {
        ensure_positive(quantity, "received quantity")?;
        self.inventory_item_count += 1;
        self.quantity_total += quantity;
        self.quantity_on_hand += quantity;
        self.quantity_available += quantity;
        Ok(())
    }

    /// Reserve `quantity` against the available counter.
    ///
    /// Fails with [`DomainError::InsufficientStock`] and leaves the counters
    /// untouched when more is requested than is available.
    pub fn reserve(&mut self, quantity: Decimal) -> DomainResult<()> {
        ensure_positive(quantity, "reserved quantity")?;
        if quantity > self.quantity_available {
            return Err(DomainError::insufficient_stock(quantity, self.quantity_available));
        }
        self.quantity_available -= quantity;
        Ok(())
    }

    /// Remove shipped stock from the on-hand counter.
    ///
    /// The quantity was reserved earlier, so the available counter is unchanged.
    pub fn ship(&mut self, quantity: Decimal) -> DomainResult<()> {
        ensure_positive(quantity, "shipped quantity")?;
        let on_hand = self.quantity_on_hand - quantity;
        if on_hand < self.quantity_available {
            return Err(DomainError::invariant(format!(
                "shipping {} for product {} in warehouse {} would leave {} on hand below {} available",
                quantity, self.product_id, self.warehouse_id, on_hand, self.quantity_available
            )));
        }
        self.quantity_on_hand = on_hand;
        Ok(())
    }

    pub fn check_invariants(&self) -> DomainResult<()> {
        let ordered = Decimal::ZERO <= self.quantity_available
            && self.quantity_available <= self.quantity_on_hand
            && self.quantity_on_hand <= self.quantity_total;
        if !ordered || self.inventory_item_count < 0 {
            return Err(DomainError::invariant(format!(
                "statistics for product {} in warehouse {} out of order: available {}, on hand {}, total {}",
                self.product_id,
                self.warehouse_id,
                self.quantity_available,
                self.quantity_on_hand,
                self.quantity_total
            )));
        }
        Ok(())
    }

    /// Quantity reserved by orders but not yet shipped.
    pub fn quantity_reserved(&self) -> Decimal {
        self.quantity_on_hand - self.quantity_available
    }
}
