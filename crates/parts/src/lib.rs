//! Parts catalog module.
//!
//! Parts, the suppliers that sell them, their price breaks and the bill of
//! materials linking assemblies to sub-parts. Pure data + validation; the
//! only storage here is the in-memory catalog used for dev/test and seeding.

pub mod bom;
pub mod catalog;
pub mod part;
pub mod price_break;
pub mod seed;
pub mod supplier;

pub use bom::BomItem;
pub use catalog::{CatalogError, InMemoryPartCatalog, PartCatalog, PurchaseHistory, StockLevels};
pub use part::Part;
pub use price_break::{PriceBreak, PriceBreaks};
pub use seed::CatalogSeed;
pub use supplier::SupplierPart;
