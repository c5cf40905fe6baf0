//! Supplier price lookup.

use rust_decimal::Decimal;

use inventree_core::{PartId, PriceRange, span};
use inventree_parts::{CatalogError, PartCatalog};

/// Cheapest and dearest total purchase price for `quantity` units across
/// every supplier of `part`.
///
/// Supplier parts without usable price breaks are ignored; if none resolve
/// the result is `None`.
pub fn supplier_price_range(
    catalog: &dyn PartCatalog,
    part: PartId,
    quantity: Decimal,
) -> Result<Option<PriceRange>, CatalogError> {
    let prices = catalog
        .supplier_parts(part)?
        .iter()
        .filter_map(|sp| sp.price_at(quantity))
        .collect::<Vec<_>>();

    Ok(span(prices))
}
