//! `depot-auth` — bearer token authentication boundary.
//!
//! Tokens only establish who the caller is; the ledger records that user on the
//! rows it creates. Decoupled from HTTP and storage.

pub mod claims;
pub mod validator;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use validator::{Hs256JwtValidator, JwtError, JwtValidator};
