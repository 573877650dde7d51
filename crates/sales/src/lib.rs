//! Sales domain module.
//!
//! Sale orders, their lines and the order status state machine, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod order;
pub mod status;

pub use order::{NewSaleOrder, OrderLine, SaleOrder, SaleOrderItem};
pub use status::SaleOrderStatus;
