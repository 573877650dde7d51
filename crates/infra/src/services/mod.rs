//! Ledger operations, each one transaction over a `LedgerStore`.

pub mod fulfillment;
pub mod orders;
pub mod pricing;
pub mod queries;
pub mod receiving;
pub mod reservation;

pub use fulfillment::{ExportOutcome, ExportSaleOrderItem, FulfillmentService};
pub use orders::OrderLifecycle;
pub use pricing::PriceCatalog;
pub use queries::LedgerQueries;
pub use receiving::{ReceiveStock, ReceivedStock, ReceivingService};
pub use reservation::{PlaceOrder, PlacedOrder, ReservationService};

use crate::ledger::LedgerStore;

/// Every ledger service wired to one store.
#[derive(Debug, Clone)]
pub struct LedgerServices<S> {
    pub reservation: ReservationService<S>,
    pub fulfillment: FulfillmentService<S>,
    pub receiving: ReceivingService<S>,
    pub pricing: PriceCatalog<S>,
    pub orders: OrderLifecycle<S>,
    pub queries: LedgerQueries<S>,
}

impl<S: LedgerStore + Clone> LedgerServices<S> {
    pub fn new(store: S) -> Self {
        Self {
            reservation: ReservationService::new(store.clone()),
            fulfillment: FulfillmentService::new(store.clone()),
            receiving: ReceivingService::new(store.clone()),
            pricing: PriceCatalog::new(store.clone()),
            orders: OrderLifecycle::new(store.clone()),
            queries: LedgerQueries::new(store),
        }
    }
}
