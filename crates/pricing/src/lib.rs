//! Part pricing.
//!
//! Aggregates supplier prices, BOM roll-ups and manually set internal/list
//! prices into a per-request pricing context. Everything here is read-only
//! over the catalog: results are computed per call and never stored.

pub mod bom;
pub mod context;
pub mod internal;
pub mod supplier;

pub use bom::{BomPricer, BomPricingMode};
pub use context::{PartSummary, PricingContext, PricingError, PricingService, PricingSettings, facet};
pub use internal::{internal_price, list_price};
pub use supplier::supplier_price_range;
