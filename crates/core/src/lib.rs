//! `depot-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod quantity;

pub use error::{DomainError, DomainResult};
pub use id::{
    CustomerId, FacilityId, InventoryItemDetailId, InventoryItemId, ProductId, ProductPriceId,
    SaleOrderId, UserId, WarehouseId,
};
pub use quantity::{ensure_non_negative, ensure_positive};
pub use rust_decimal::Decimal;
