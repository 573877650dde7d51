//! Product price history maintenance and the effective-price lookup.

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use depot_core::{ProductId, UserId};
use depot_products::{EffectivePrice, NewProductPrice, ProductPrice};

use crate::ledger::{Isolation, LedgerResult, LedgerStore, LedgerTx};

#[derive(Debug, Clone)]
pub struct PriceCatalog<S> {
    store: S,
}

impl<S: LedgerStore> PriceCatalog<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Append a price and close every price it supersedes, so that at most one
    /// price of the product is effective at any instant.
    #[instrument(skip(self, input), fields(product_id = %input.product_id, effective_from = %input.effective_from), err)]
    pub async fn set_price(
        &self,
        input: NewProductPrice,
        actor: UserId,
        at: DateTime<Utc>,
    ) -> LedgerResult<ProductPrice> {
        let price = input.into_price(actor, at)?;

        let mut tx = self.store.begin(Isolation::ReadCommitted).await?;
        let closed = tx.close_superseded_prices(price.product_id, price.effective_from).await?;
        tx.insert_price(&price).await?;
        tx.commit().await?;

        info!(price_id = %price.id, closed, "product price added");
        Ok(price)
    }

    #[instrument(skip(self), fields(product_id = %product_id), err)]
    pub async fn effective_price(
        &self,
        product_id: ProductId,
        at: DateTime<Utc>,
    ) -> LedgerResult<Option<EffectivePrice>> {
        self.store.effective_price(product_id, at).await
    }
}
