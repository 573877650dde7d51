use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use depot_core::{DomainError, DomainResult, ProductId, ProductPriceId, UserId, ensure_non_negative};

/// One row of a product's price history.
///
/// A price is effective at `at` when `effective_from <= at` and it has not yet
/// expired (`expired_at` is open or later than `at`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPrice {
    pub id: ProductPriceId,
    pub product_id: ProductId,
    pub price: Decimal,
    pub currency_uom_id: String,
    pub created_by: UserId,
    pub effective_from: DateTime<Utc>,
    pub expired_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// The `EffectivePrice(productId, at)` contract consumed by order placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectivePrice {
    pub price_id: ProductPriceId,
    pub price: Decimal,
    pub currency_uom_id: String,
}

/// Input for appending a new price to a product's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProductPrice {
    pub product_id: ProductId,
    pub price: Decimal,
    pub currency_uom_id: String,
    pub effective_from: DateTime<Utc>,
}

impl NewProductPrice {
    pub fn validate(&self) -> DomainResult<()> {
        ensure_non_negative(self.price, "price")?;
        if self.currency_uom_id.trim().is_empty() {
            return Err(DomainError::validation("currency_uom_id must not be empty"));
        }
        Ok(())
    }

    /// Materialize the open-ended price row this input describes.
    pub fn into_price(self, created_by: UserId, created_at: DateTime<Utc>) -> DomainResult<ProductPrice> {
        self.validate()?;
        Ok(ProductPrice {
            id: ProductPriceId::new(),
            product_id: self.product_id,
            price: self.price,
            currency_uom_id: self.currency_uom_id,
            created_by,
            effective_from: self.effective_from,
            expired_at: None,
            created_at,
        })
    }
}

impl ProductPrice {
    pub fn is_effective_at(&self, at: DateTime<Utc>) -> bool {
        self.effective_from <= at && self.expired_at.is_none_or(|expired| at < expired)
    }

    /// Whether a new price starting at `effective_from` closes this row.
    ///
    /// Matches the storage-side predicate
    /// `expired_at IS NULL OR $effective_from < expired_at`.
    pub fn is_superseded_by(&self, effective_from: DateTime<Utc>) -> bool {
        self.expired_at.is_none_or(|expired| effective_from < expired)
    }

    pub fn as_effective(&self) -> EffectivePrice {
        EffectivePrice {
            price_id: self.id,
            price: self.price,
            currency_uom_id: self.currency_uom_id.clone(),
        }
    }
}

/// Resolve the price of `product_id` effective at `at`.
///
/// If the history ever holds more than one matching row, the one with the latest
/// `effective_from` wins.
pub fn resolve_effective<'a>(
    prices: impl IntoIterator<Item = &'a ProductPrice>,
    product_id: ProductId,
    at: DateTime<Utc>,
) -> Option<&'a ProductPrice> {
    prices
        .into_iter()
        .filter(|p| p.product_id == product_id && p.is_effective_at(at))
        .max_by_key(|p| p.effective_from)
}

/// Close every row of `product_id` that a price starting at `effective_from` supersedes.
///
/// A row scheduled to start after `effective_from` is closed at its own start,
/// leaving it an empty window. Returns how many rows were closed.
pub fn supersede_open_prices<'a>(
    prices: impl IntoIterator<Item = &'a mut ProductPrice>,
    product_id: ProductId,
    effective_from: DateTime<Utc>,
) -> u64 {
    let mut closed = 0;
    for price in prices {
        if price.product_id == product_id && price.is_superseded_by(effective_from) {
            price.expired_at = Some(effective_from.max(price.effective_from));
            closed += 1;
        }
    }
    closed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn test_product_id() -> ProductId {
        ProductId::new(10)
    }

    fn price_at(amount: i64, effective_from: DateTime<Utc>) -> ProductPrice {
        NewProductPrice {
            product_id: test_product_id(),
            price: Decimal::new(amount, 0),
            currency_uom_id: "USD".to_string(),
            effective_from,
        }
        .into_price(UserId::new(), effective_from)
        .unwrap()
    }

    /// Append a price the way the catalog does: close superseded rows, then push.
    fn append(history: &mut Vec<ProductPrice>, price: ProductPrice) {
        supersede_open_prices(history.iter_mut(), price.product_id, price.effective_from);
        history.push(price);
    }

    #[test]
    fn open_price_is_effective_from_its_start() {
        let now = Utc::now();
        let p = price_at(5, now);

        assert!(!p.is_effective_at(now - Duration::seconds(1)));
        assert!(p.is_effective_at(now));
        assert!(p.is_effective_at(now + Duration::days(365)));
    }

    #[test]
    fn expiry_is_exclusive() {
        let now = Utc::now();
        let mut p = price_at(5, now - Duration::hours(1));
        p.expired_at = Some(now);

        assert!(p.is_effective_at(now - Duration::seconds(1)));
        assert!(!p.is_effective_at(now));
    }

    #[test]
    fn new_price_closes_previous_open_price_at_its_start() {
        let now = Utc::now();
        let mut history = Vec::new();
        append(&mut history, price_at(5, now - Duration::hours(2)));
        append(&mut history, price_at(7, now - Duration::hours(1)));

        assert_eq!(history[0].expired_at, Some(now - Duration::hours(1)));
        assert_eq!(history[1].expired_at, None);

        let resolved = resolve_effective(&history, test_product_id(), now).unwrap();
        assert_eq!(resolved.price, Decimal::new(7, 0));

        let earlier = resolve_effective(&history, test_product_id(), now - Duration::minutes(90)).unwrap();
        assert_eq!(earlier.price, Decimal::new(5, 0));
    }

    #[test]
    fn future_price_leaves_current_price_effective_until_it_starts() {
        let now = Utc::now();
        let mut history = Vec::new();
        append(&mut history, price_at(5, now - Duration::hours(1)));
        append(&mut history, price_at(9, now + Duration::hours(1)));

        let resolved = resolve_effective(&history, test_product_id(), now).unwrap();
        assert_eq!(resolved.price, Decimal::new(5, 0));
    }

    #[test]
    fn earlier_price_closes_scheduled_price_at_its_own_start() {
        let now = Utc::now();
        let mut history = Vec::new();
        append(&mut history, price_at(9, now + Duration::days(1)));
        append(&mut history, price_at(5, now));

        assert_eq!(history[0].expired_at, Some(now + Duration::days(1)));
        assert!(history.iter().all(|p| p.expired_at.is_none_or(|e| p.effective_from <= e)));

        let later = resolve_effective(&history, test_product_id(), now + Duration::days(2)).unwrap();
        assert_eq!(later.price, Decimal::new(5, 0));
    }

    #[test]
    fn no_price_before_first_effective_from() {
        let now = Utc::now();
        let history = vec![price_at(5, now)];

        assert!(resolve_effective(&history, test_product_id(), now - Duration::seconds(1)).is_none());
        assert!(resolve_effective(&history, ProductId::new(99), now).is_none());
    }

    #[test]
    fn other_products_are_not_closed() {
        let now = Utc::now();
        let mut history = vec![price_at(5, now - Duration::hours(1))];
        let closed = supersede_open_prices(history.iter_mut(), ProductId::new(99), now);

        assert_eq!(closed, 0);
        assert!(history[0].expired_at.is_none());
    }

    #[test]
    fn negative_price_is_rejected() {
        let input = NewProductPrice {
            product_id: test_product_id(),
            price: Decimal::new(-1, 0),
            currency_uom_id: "USD".to_string(),
            effective_from: Utc::now(),
        };

        match input.validate() {
            Err(DomainError::Validation(msg)) => assert!(msg.contains("price")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: after any sequence of appends in chronological order, at most
            /// one row is effective at any instant.
            #[test]
            fn at_most_one_price_effective(
                offsets in prop::collection::vec(1i64..10_000i64, 1..12),
                probe in 0i64..200_000i64,
            ) {
                let base = Utc::now();
                let mut history = Vec::new();
                let mut start = 0i64;
                for (idx, offset) in offsets.iter().enumerate() {
                    start += offset;
                    append(&mut history, price_at(idx as i64 + 1, base + Duration::seconds(start)));
                }

                let at = base + Duration::seconds(probe);
                let effective = history.iter().filter(|p| p.is_effective_at(at)).count();
                prop_assert!(effective <= 1);

                let open = history.iter().filter(|p| p.expired_at.is_none()).count();
                prop_assert_eq!(open, 1);
            }
        }
    }
}
