//! Price catalog domain module.
//!
//! This crate contains the rules for a product's price history, implemented purely
//! as deterministic domain logic (no IO, no HTTP, no storage).

pub mod price;

pub use price::{EffectivePrice, NewProductPrice, ProductPrice, resolve_effective, supersede_open_prices};
