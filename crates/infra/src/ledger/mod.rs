//! Ledger storage: the transactional seam plus its in-memory and Postgres backends.

pub mod error;
pub mod in_memory;
pub mod postgres;
pub mod store;

pub use error::{LedgerError, LedgerResult};
pub use in_memory::{InMemoryLedgerStore, InMemoryLedgerTx};
pub use postgres::{PgLedgerTx, PostgresLedgerStore};
pub use store::{ExportLine, Isolation, LedgerStore, LedgerTx, SaleOrderLineView, SaleOrderView};
