//! `inventree-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the domain error model, and the decimal price helpers shared
//! by the catalog, stock and pricing crates.

pub mod entity;
pub mod error;
pub mod flags;
pub mod id;
pub mod price;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use flags::str2bool;
pub use id::{
    BomItemId, PartId, PurchaseOrderId, PurchaseOrderLineId, StockItemId, SupplierPartId,
};
pub use price::{
    Currency, MAX_QUANTITY, PriceRange, effective_quantity, parse_quantity, round_price, span,
};
pub use value_object::ValueObject;
