use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use depot_core::{
    DomainError, DomainResult, InventoryItemId, ProductId, WarehouseId, ensure_non_negative,
    ensure_positive,
};

use crate::fifo::LotBalance;

/// A lot: one physical receipt of a product at a warehouse.
///
/// `quantity` is what was received and never changes. `quantity_on_hand` only
/// decreases, and only through fulfillment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: InventoryItemId,
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub quantity: Decimal,
    pub quantity_on_hand: Decimal,
    pub unit_cost: Decimal,
    pub currency_uom_id: String,
    pub created_at: DateTime<Utc>,
}

/// A stock receipt: creates one lot and feeds the statistics aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockReceipt {
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub currency_uom_id: String,
}

impl StockReceipt {
    pub fn validate(&self) -> DomainResult<()> {
        ensure_positive(self.quantity, "quantity")?;
        ensure_non_negative(self.unit_cost, "unit cost")?;
        if self.currency_uom_id.trim().is_empty() {
            return Err(DomainError::validation("currency_uom_id must not be empty"));
        }
        Ok(())
    }

    /// Build the lot for this receipt once storage has assigned its id.
    pub fn into_lot(self, id: InventoryItemId, created_at: DateTime<Utc>) -> InventoryItem {
        InventoryItem {
            id,
            product_id: self.product_id,
            warehouse_id: self.warehouse_id,
            quantity: self.quantity,
            quantity_on_hand: self.quantity,
            unit_cost: self.unit_cost,
            currency_uom_id: self.currency_uom_id,
            created_at,
        }
    }
}

impl InventoryItem {
    /// Remove `amount` from the lot's remaining stock.
    pub fn deplete(&mut self, amount: Decimal) -> DomainResult<()> {
        ensure_positive(amount, "depleted quantity")?;
        if amount > self.quantity_on_hand {
            return Err(DomainError::invariant(format!(
                "lot {} holds {} on hand, cannot deplete {}",
                self.id, self.quantity_on_hand, amount
            )));
        }
        self.quantity_on_hand -= amount;
        Ok(())
    }

    pub fn balance(&self) -> LotBalance {
        LotBalance {
            lot_id: self.id,
            quantity_on_hand: self.quantity_on_hand,
        }
    }

    pub fn is_depleted(&self) -> bool {
        self.quantity_on_hand <= Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt(quantity: i64) -> StockReceipt {
        StockReceipt {
            product_id: ProductId::new(1),
            warehouse_id: WarehouseId::new(),
            quantity: Decimal::new(quantity, 0),
            unit_cost: Decimal::new(250, 2),
            currency_uom_id: "USD".to_string(),
        }
    }

    #[test]
    fn receipt_creates_full_lot() {
        let lot = receipt(8).into_lot(InventoryItemId::new(1), Utc::now());

        assert_eq!(lot.quantity, Decimal::new(8, 0));
        assert_eq!(lot.quantity_on_hand, Decimal::new(8, 0));
        assert!(!lot.is_depleted());
    }

    #[test]
    fn receipt_rejects_non_positive_quantity() {
        assert!(receipt(0).validate().is_err());
        assert!(receipt(-3).validate().is_err());
        assert!(receipt(1).validate().is_ok());
    }

    #[test]
    fn receipt_rejects_blank_currency() {
        let mut r = receipt(1);
        r.currency_uom_id = "  ".to_string();
        assert!(r.validate().is_err());
    }

    #[test]
    fn deplete_reduces_on_hand_but_not_received_quantity() {
        let mut lot = receipt(5).into_lot(InventoryItemId::new(1), Utc::now());
        lot.deplete(Decimal::new(5, 0)).unwrap();

        assert_eq!(lot.quantity, Decimal::new(5, 0));
        assert_eq!(lot.quantity_on_hand, Decimal::ZERO);
        assert!(lot.is_depleted());
    }

    #[test]
    fn deplete_beyond_on_hand_is_an_invariant_violation() {
        let mut lot = receipt(2).into_lot(InventoryItemId::new(1), Utc::now());
        let err = lot.deplete(Decimal::new(3, 0)).unwrap_err();

        match err {
            DomainError::InvariantViolation(msg) => assert!(msg.contains("cannot deplete")),
            other => panic!("expected invariant violation, got {other:?}"),
        }
        assert_eq!(lot.quantity_on_hand, Decimal::new(2, 0));
    }
}
