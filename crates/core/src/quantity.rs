//! Quantity and amount guards shared by the ledger domains.

use rust_decimal::Decimal;

use crate::error::{DomainError, DomainResult};

/// Require a strictly positive quantity.
pub fn ensure_positive(value: Decimal, what: &str) -> DomainResult<()> {
    if value <= Decimal::ZERO {
        return Err(DomainError::validation(format!(
            "{what} must be greater than zero, got {value}"
        )));
    }
    Ok(())
}

/// Require a quantity or amount that is not negative.
pub fn ensure_non_negative(value: Decimal, what: &str) -> DomainResult<()> {
    if value < Decimal::ZERO {
        return Err(DomainError::validation(format!(
            "{what} must not be negative, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_not_positive() {
        assert!(ensure_positive(Decimal::ZERO, "quantity").is_err());
        assert!(ensure_positive(Decimal::new(-1, 0), "quantity").is_err());
        assert!(ensure_positive(Decimal::new(1, 2), "quantity").is_ok());
    }

    #[test]
    fn zero_is_non_negative() {
        assert!(ensure_non_negative(Decimal::ZERO, "unit cost").is_ok());
        assert!(ensure_non_negative(Decimal::new(-5, 1), "unit cost").is_err());
    }
}
