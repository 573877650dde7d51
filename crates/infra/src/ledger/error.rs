use rust_decimal::Decimal;
use thiserror::Error;

use depot_core::{DomainError, ProductId, SaleOrderId};
use depot_sales::SaleOrderStatus;

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Failure of a ledger operation.
///
/// Every variant raised inside a transaction means the transaction was rolled
/// back; no partial mutation is ever persisted. Export of an already exported
/// line is not an error, see `ExportOutcome::AlreadyExported`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Input rejected before any write (e.g. non-positive quantity).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Requested quantity exceeds the available counter.
    #[error("quantity available exceeded for product {product_id}: requested {requested}, available {available}")]
    Oversell {
        product_id: ProductId,
        requested: Decimal,
        available: Decimal,
    },

    /// No price of the product is effective at the order time.
    #[error("no effective price for product {0}")]
    PriceNotFound(ProductId),

    /// The order's status does not allow the requested step.
    #[error("sale order {sale_order_id} cannot move from {from} to {to}")]
    InvalidTransition {
        sale_order_id: SaleOrderId,
        from: SaleOrderStatus,
        to: SaleOrderStatus,
    },

    /// Stored state contradicts a ledger invariant (e.g. lots exhausted during export).
    #[error("data integrity violation: {0}")]
    DataIntegrity(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// A precondition held when checked but no longer held at write time.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Serialization failure, deadlock, timeout or lost connection.
    #[error("transient storage failure: {0}")]
    Transient(String),

    #[error("storage error: {0}")]
    Store(String),
}

impl LedgerError {
    /// Whether repeating the same call may succeed without changing its input.
    pub fn is_transient(&self) -> bool {
        matches!(self, LedgerError::Transient(_))
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        LedgerError::NotFound(what.into())
    }

    pub fn data_integrity(msg: impl Into<String>) -> Self {
        LedgerError::DataIntegrity(msg.into())
    }
}

impl From<DomainError> for LedgerError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => LedgerError::Validation(msg),
            DomainError::InvariantViolation(msg) => LedgerError::DataIntegrity(msg),
            err @ DomainError::InsufficientStock { .. } => LedgerError::DataIntegrity(err.to_string()),
            err @ DomainError::InvalidTransition { .. } => LedgerError::Conflict(err.to_string()),
        }
    }
}
