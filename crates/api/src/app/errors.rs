use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use depot_infra::ledger::LedgerError;

pub fn ledger_error_to_response(err: LedgerError) -> axum::response::Response {
    match err {
        LedgerError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        err @ LedgerError::Oversell { .. } => json_error(StatusCode::CONFLICT, "oversell", err.to_string()),
        err @ LedgerError::PriceNotFound(_) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "price_not_found", err.to_string())
        }
        err @ LedgerError::InvalidTransition { .. } => {
            json_error(StatusCode::CONFLICT, "invalid_transition", err.to_string())
        }
        LedgerError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        LedgerError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        LedgerError::DataIntegrity(msg) => {
            tracing::error!(error = %msg, "ledger data integrity violation");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "data_integrity", msg)
        }
        LedgerError::Transient(msg) => json_error(StatusCode::SERVICE_UNAVAILABLE, "transient", msg),
        LedgerError::Store(msg) => json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use depot_core::{ProductId, SaleOrderId};
    use depot_sales::SaleOrderStatus;
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn ledger_errors_map_to_statuses() {
        let cases = [
            (LedgerError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (
                LedgerError::Oversell {
                    product_id: ProductId::new(1),
                    requested: Decimal::TWO,
                    available: Decimal::ONE,
                },
                StatusCode::CONFLICT,
            ),
            (LedgerError::PriceNotFound(ProductId::new(1)), StatusCode::UNPROCESSABLE_ENTITY),
            (
                LedgerError::InvalidTransition {
                    sale_order_id: SaleOrderId::new(1),
                    from: SaleOrderStatus::Pending,
                    to: SaleOrderStatus::Completed,
                },
                StatusCode::CONFLICT,
            ),
            (LedgerError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (LedgerError::Conflict("x".into()), StatusCode::CONFLICT),
            (LedgerError::DataIntegrity("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (LedgerError::Transient("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (LedgerError::Store("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(ledger_error_to_response(err).status(), status);
        }
    }
}
