//! Infrastructure layer: ledger storage, ledger services, DB wiring and config.

pub mod config;
pub mod db;
pub mod ledger;
pub mod services;


pub use config::{AppConfig, ConfigError};
pub use ledger::{
    InMemoryLedgerStore, Isolation, LedgerError, LedgerResult, LedgerStore, LedgerTx, PostgresLedgerStore,
    SaleOrderLineView, SaleOrderView,
};
pub use services::LedgerServices;
