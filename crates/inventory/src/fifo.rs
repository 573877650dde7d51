//! FIFO lot consumption.
//!
//! The walk is a pure function of the lots (already ordered oldest first) and the
//! requested quantity, so tie-breaks and partial-lot consumption can be tested
//! without a store.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use depot_core::{DomainError, DomainResult, InventoryItemId, ensure_positive};

/// Remaining stock of one lot, as seen by the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotBalance {
    pub lot_id: InventoryItemId,
    pub quantity_on_hand: Decimal,
}

/// How much the walk takes from one lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotConsumption {
    pub lot_id: InventoryItemId,
    pub quantity: Decimal,
}

/// Consume `requested` from `lots` in the given order.
///
/// Each lot contributes `min(remaining, quantity_on_hand)`; lots with nothing on
/// hand are skipped. Fails with [`DomainError::InsufficientStock`] if the lots run
/// out before `requested` is covered, in which case nothing should be applied.
pub fn allocate_fifo(lots: &[LotBalance], requested: Decimal) -> DomainResult<Vec<LotConsumption>> {
    ensure_positive(requested, "requested quantity")?;

    let mut remaining = requested;
    let mut consumed = Vec::new();

    for lot in lots {
        if remaining.is_zero() {
            break;
        }
        if lot.quantity_on_hand <= Decimal::ZERO {
            continue;
        }

        let take = remaining.min(lot.quantity_on_hand);
        consumed.push(LotConsumption {
            lot_id: lot.lot_id,
            quantity: take,
        });
        remaining -= take;
    }

    if !remaining.is_zero() {
        return Err(DomainError::insufficient_stock(requested, requested - remaining));
    }

    Ok(consumed)
}
