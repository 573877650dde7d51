use core::str::FromStr;

use axum::http::StatusCode;

use crate::app::errors;

/// Parse a path segment into a typed id, or a 400 naming what was malformed.
pub fn parse_path_id<T: FromStr>(raw: &str, what: &'static str) -> Result<T, axum::response::Response> {
    raw.trim()
        .parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid {what} id")))
}

#[cfg(test)]
mod tests {
    use depot_core::{SaleOrderId, WarehouseId};

    use super::*;

    #[test]
    fn parses_serial_and_uuid_ids() {
        let id: SaleOrderId = parse_path_id("42", "sale order").unwrap();
        assert_eq!(id, SaleOrderId::new(42));

        let wh = WarehouseId::new();
        let parsed: WarehouseId = parse_path_id(&wh.to_string(), "warehouse").unwrap();
        assert_eq!(parsed, wh);
    }

    #[test]
    fn malformed_id_is_bad_request() {
        let err = parse_path_id::<SaleOrderId>("abc", "sale order").unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
