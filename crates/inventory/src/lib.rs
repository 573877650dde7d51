//! Stock ledger domain module.
//!
//! This crate contains business rules for lots, the per-(warehouse, product)
//! statistics aggregate and FIFO lot consumption, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod detail;
pub mod fifo;
pub mod item;
pub mod statistics;

pub use detail::InventoryItemDetail;
pub use fifo::{LotBalance, LotConsumption, allocate_fifo};
pub use item::{InventoryItem, StockReceipt};
pub use statistics::WarehouseProductStatistics;
