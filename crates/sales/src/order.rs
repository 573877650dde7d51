use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use depot_core::{
    CustomerId, DomainError, DomainResult, FacilityId, ProductId, ProductPriceId, SaleOrderId, UserId,
    WarehouseId, ensure_positive,
};

use crate::status::SaleOrderStatus;

/// A sale order header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleOrder {
    pub id: SaleOrderId,
    pub customer_id: CustomerId,
    pub original_warehouse_id: WarehouseId,
    pub created_by: UserId,
    pub ship_to_address: String,
    pub ship_to_facility_customer_id: Option<FacilityId>,
    pub status: SaleOrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One line of a sale order, pinned to the price row that was effective when
/// the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleOrderItem {
    pub sale_order_id: SaleOrderId,
    pub sale_order_seq: i32,
    pub product_price_id: ProductPriceId,
    pub quantity: Decimal,
    pub exported: bool,
}

/// One requested product of a new order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: Decimal,
}

/// Input for placing an order. Lines are reserved in the given order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSaleOrder {
    pub customer_id: CustomerId,
    pub warehouse_id: WarehouseId,
    pub lines: Vec<OrderLine>,
    pub ship_to_address: String,
    pub customer_store_id: Option<FacilityId>,
}

impl NewSaleOrder {
    /// Reject the order before anything is written.
    pub fn validate(&self) -> DomainResult<()> {
        if self.lines.is_empty() {
            return Err(DomainError::validation("order must contain at least one product"));
        }
        for (seq, line) in self.lines.iter().enumerate() {
            ensure_positive(line.quantity, &format!("quantity of line {seq}"))?;
        }
        Ok(())
    }

    /// The header row for this order once storage has assigned its id.
    pub fn into_order(&self, id: SaleOrderId, created_by: UserId, at: DateTime<Utc>) -> SaleOrder {
        SaleOrder {
            id,
            customer_id: self.customer_id,
            original_warehouse_id: self.warehouse_id,
            created_by,
            ship_to_address: self.ship_to_address.clone(),
            ship_to_facility_customer_id: self.customer_store_id,
            status: SaleOrderStatus::Pending,
            created_at: at,
            updated_at: at,
        }
    }
}

impl SaleOrder {
    /// Move to `next` if the transition table allows it; returns the previous status.
    pub fn transition(&mut self, next: SaleOrderStatus, at: DateTime<Utc>) -> DomainResult<SaleOrderStatus> {
        let previous = self.status;
        self.status = previous.transition_to(next)?;
        self.updated_at = at;
        Ok(previous)
    }
}

impl SaleOrderItem {
    pub fn new(
        sale_order_id: SaleOrderId,
        sale_order_seq: i32,
        product_price_id: ProductPriceId,
        quantity: Decimal,
    ) -> Self {
        Self {
            sale_order_id,
            sale_order_seq,
            product_price_id,
            quantity,
            exported: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn line(product: i64, qty: i64) -> OrderLine {
        OrderLine {
            product_id: ProductId::new(product),
            quantity: Decimal::new(qty, 0),
        }
    }

    fn new_order(lines: Vec<OrderLine>) -> NewSaleOrder {
        NewSaleOrder {
            customer_id: CustomerId::new(),
            warehouse_id: WarehouseId::new(),
            lines,
            ship_to_address: "12 Dock Road".to_string(),
            customer_store_id: None,
        }
    }

    #[test]
    fn valid_order_passes() {
        new_order(vec![line(1, 2), line(2, 1)]).validate().unwrap();
    }

    #[test]
    fn empty_order_is_rejected() {
        assert!(matches!(
            new_order(vec![]).validate(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn any_non_positive_line_rejects_the_whole_order() {
        let err = new_order(vec![line(1, 2), line(2, 0), line(3, 1)])
            .validate()
            .unwrap_err();

        match err {
            DomainError::Validation(msg) => assert!(msg.contains("line 1")),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(new_order(vec![line(1, -1)]).validate().is_err());
    }

    #[test]
    fn new_orders_start_pending() {
        let input = new_order(vec![line(1, 1)]);
        let order = input.into_order(SaleOrderId::new(1), UserId::new(), test_time());

        assert_eq!(order.status, SaleOrderStatus::Pending);
        assert_eq!(order.original_warehouse_id, input.warehouse_id);
        assert_eq!(order.created_at, order.updated_at);
    }

    #[test]
    fn transition_updates_status_and_timestamp() {
        let created = test_time();
        let mut order = new_order(vec![line(1, 1)]).into_order(SaleOrderId::new(1), UserId::new(), created);
        let later = created + chrono::Duration::seconds(5);

        let previous = order.transition(SaleOrderStatus::Accepted, later).unwrap();

        assert_eq!(previous, SaleOrderStatus::Pending);
        assert_eq!(order.status, SaleOrderStatus::Accepted);
        assert_eq!(order.updated_at, later);
    }

    #[test]
    fn rejected_transition_leaves_order_unchanged() {
        let mut order = new_order(vec![line(1, 1)]).into_order(SaleOrderId::new(1), UserId::new(), test_time());
        let before = order.clone();

        assert!(order.transition(SaleOrderStatus::Completed, test_time()).is_err());
        assert_eq!(order, before);
    }

    #[test]
    fn new_items_are_not_exported() {
        let item = SaleOrderItem::new(SaleOrderId::new(1), 0, ProductPriceId::new(), Decimal::ONE);
        assert!(!item.exported);
    }
}
