//! BOM price roll-up.

use std::collections::HashSet;

use rust_decimal::Decimal;

use inventree_core::{PartId, PriceRange, span};
use inventree_parts::{CatalogError, Part, PartCatalog, PurchaseHistory};

use crate::supplier::supplier_price_range;

/// Which price sources a roll-up may use for sub-parts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BomPricingMode {
    /// Prefer a sub-part's internal price when it has one.
    pub internal: bool,
    /// Prefer what was actually paid for a sub-part's stock.
    pub purchase: bool,
}

impl BomPricingMode {
    pub fn market() -> Self {
        Self::default()
    }

    pub fn internal() -> Self {
        Self {
            internal: true,
            purchase: false,
        }
    }

    pub fn purchase() -> Self {
        Self {
            internal: false,
            purchase: true,
        }
    }
}

/// Rolls BOM lines up into a price range for an assembly.
pub struct BomPricer<'a> {
    catalog: &'a dyn PartCatalog,
    history: &'a dyn PurchaseHistory,
}

impl<'a> BomPricer<'a> {
    pub fn new(catalog: &'a dyn PartCatalog, history: &'a dyn PurchaseHistory) -> Self {
        Self { catalog, history }
    }

    /// Price range of building `quantity` of `part` from its BOM.
    ///
    /// Each line contributes its sub-part's price range at
    /// `quantity × line quantity`. Lines whose sub-part has no price are
    /// skipped; if no line resolves, or the total overflows, the result is
    /// `None`.
    pub fn bom_price_range(
        &self,
        part: PartId,
        quantity: Decimal,
        mode: BomPricingMode,
    ) -> Result<Option<PriceRange>, CatalogError> {
        let mut path = HashSet::new();
        self.bom_range_on_path(part, quantity, mode, &mut path)
    }

    /// Price range of `quantity` of `part` from any applicable source.
    pub fn part_price_range(
        &self,
        part: PartId,
        quantity: Decimal,
        mode: BomPricingMode,
    ) -> Result<Option<PriceRange>, CatalogError> {
        let mut path = HashSet::new();
        self.part_range_on_path(part, quantity, mode, &mut path)
    }

    fn bom_range_on_path(
        &self,
        part: PartId,
        quantity: Decimal,
        mode: BomPricingMode,
        path: &mut HashSet<PartId>,
    ) -> Result<Option<PriceRange>, CatalogError> {
        path.insert(part);

        let mut total: Option<PriceRange> = None;
        for line in self.catalog.bom_items(part)? {
            if line.sub_part == part {
                tracing::warn!(part = %part, "BOM contains a reference to its own part, skipping");
                continue;
            }
            if path.contains(&line.sub_part) {
                tracing::warn!(
                    part = %part,
                    sub_part = %line.sub_part,
                    "BOM recursion detected, skipping line"
                );
                continue;
            }

            let Some(line_quantity) = quantity.checked_mul(line.quantity) else {
                tracing::warn!(part = %part, sub_part = %line.sub_part, "BOM line quantity overflowed");
                path.remove(&part);
                return Ok(None);
            };
            let Some(range) = self.part_range_on_path(line.sub_part, line_quantity, mode, path)? else {
                continue;
            };
            let Some(sum) = total.unwrap_or_else(PriceRange::zero).checked_add(range) else {
                tracing::warn!(part = %part, "BOM price overflowed, leaving assembly unpriced");
                path.remove(&part);
                return Ok(None);
            };
            total = Some(sum);
        }

        path.remove(&part);
        Ok(total.map(PriceRange::normalize))
    }

    fn part_range_on_path(
        &self,
        part_id: PartId,
        quantity: Decimal,
        mode: BomPricingMode,
        path: &mut HashSet<PartId>,
    ) -> Result<Option<PriceRange>, CatalogError> {
        let Some(part) = self.catalog.part(part_id)? else {
            return Ok(None);
        };

        if mode.internal && part.has_internal_price_breaks() {
            return Ok(part.internal_price(quantity).map(PriceRange::single));
        }

        if mode.purchase {
            if let Some(range) = self.purchase_price_range(&part, quantity)? {
                return Ok(Some(range));
            }
        }

        let buy = supplier_price_range(self.catalog, part_id, quantity)?;
        let bom = self.bom_range_on_path(part_id, quantity, mode, path)?;

        Ok(match (buy, bom) {
            (None, None) => None,
            (Some(range), None) | (None, Some(range)) => Some(range),
            (Some(buy), Some(bom)) => Some(buy.merge(bom)),
        })
    }

    /// Range of historical per-unit purchase prices, scaled by `quantity`.
    fn purchase_price_range(&self, part: &Part, quantity: Decimal) -> Result<Option<PriceRange>, CatalogError> {
        let prices = self.history.purchase_prices(part.id)?;
        Ok(span(prices)
            .and_then(|range| range.checked_scale(quantity))
            .map(PriceRange::normalize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inventree_parts::{BomItem, InMemoryPartCatalog, PriceBreak, PriceBreaks, SupplierPart};
    use rust_decimal_macros::dec;

    /// Purchase history backed by a fixed list of (part, unit price) pairs.
    #[derive(Default)]
    struct FixedHistory(Vec<(PartId, Decimal)>);

    impl PurchaseHistory for FixedHistory {
        fn purchase_prices(&self, part: PartId) -> Result<Vec<Decimal>, CatalogError> {
            Ok(self.0.iter().filter(|(p, _)| *p == part).map(|(_, price)| *price).collect())
        }
    }

    fn breaks(unit: Decimal) -> PriceBreaks {
        vec![PriceBreak::new(dec!(1), unit).unwrap()].into()
    }

    fn bought(catalog: &InMemoryPartCatalog, name: &str, unit: Decimal) -> PartId {
        let id = catalog.insert_part(Part::new(name).unwrap().purchaseable()).unwrap();
        catalog
            .add_supplier_part(SupplierPart::new(id, "Acme", name).with_price_breaks(breaks(unit)))
            .unwrap();
        id
    }

    fn assembly(catalog: &InMemoryPartCatalog, name: &str, lines: &[(PartId, Decimal)]) -> PartId {
        let id = catalog.insert_part(Part::new(name).unwrap().assembly()).unwrap();
        for (child, qty) in lines {
            catalog.add_bom_item(BomItem::new(id, *child, *qty).unwrap()).unwrap();
        }
        id
    }

    #[test]
    fn sums_lines_scaled_by_quantity() {
        let catalog = InMemoryPartCatalog::new();
        let a = bought(&catalog, "A", dec!(2.00));
        let b = bought(&catalog, "B", dec!(5.00));
        let p = assembly(&catalog, "P", &[(a, dec!(3)), (b, dec!(1))]);

        let history = FixedHistory::default();
        let pricer = BomPricer::new(&catalog, &history);
        let range = pricer.bom_price_range(p, dec!(2), BomPricingMode::market()).unwrap().unwrap();
        assert_eq!(range, PriceRange::single(dec!(22)));
    }

    #[test]
    fn unpriced_lines_contribute_nothing() {
        let catalog = InMemoryPartCatalog::new();
        let a = bought(&catalog, "A", dec!(2.00));
        let unpriced = catalog.insert_part(Part::new("Mystery").unwrap()).unwrap();
        let p = assembly(&catalog, "P", &[(a, dec!(3)), (unpriced, dec!(7))]);

        let history = FixedHistory::default();
        let pricer = BomPricer::new(&catalog, &history);
        let range = pricer.bom_price_range(p, dec!(1), BomPricingMode::market()).unwrap().unwrap();
        assert_eq!(range, PriceRange::single(dec!(6)));
    }

    #[test]
    fn nothing_priced_is_absent() {
        let catalog = InMemoryPartCatalog::new();
        let unpriced = catalog.insert_part(Part::new("Mystery").unwrap()).unwrap();
        let p = assembly(&catalog, "P", &[(unpriced, dec!(1))]);

        let history = FixedHistory::default();
        let pricer = BomPricer::new(&catalog, &history);
        assert_eq!(pricer.bom_price_range(p, dec!(1), BomPricingMode::market()).unwrap(), None);
    }

    #[test]
    fn recurses_through_sub_assemblies() {
        let catalog = InMemoryPartCatalog::new();
        let screw = bought(&catalog, "Screw", dec!(0.10));
        let bracket = assembly(&catalog, "Bracket", &[(screw, dec!(4))]);
        let frame = assembly(&catalog, "Frame", &[(bracket, dec!(2))]);

        let history = FixedHistory::default();
        let pricer = BomPricer::new(&catalog, &history);
        let range = pricer.bom_price_range(frame, dec!(3), BomPricingMode::market()).unwrap().unwrap();
        // 3 frames × 2 brackets × 4 screws × 0.10
        assert_eq!(range, PriceRange::single(dec!(2.4)));
    }

    #[test]
    fn sub_assembly_with_supplier_widens_range() {
        let catalog = InMemoryPartCatalog::new();
        let screw = bought(&catalog, "Screw", dec!(1));
        let bracket = assembly(&catalog, "Bracket", &[(screw, dec!(4))]);
        catalog
            .add_supplier_part(SupplierPart::new(bracket, "Acme", "BRK").with_price_breaks(breaks(dec!(3))))
            .unwrap();
        let frame = assembly(&catalog, "Frame", &[(bracket, dec!(1))]);

        let history = FixedHistory::default();
        let pricer = BomPricer::new(&catalog, &history);
        let range = pricer.bom_price_range(frame, dec!(1), BomPricingMode::market()).unwrap().unwrap();
        assert_eq!(range, PriceRange::new(dec!(3), dec!(4)));
    }

    #[test]
    fn internal_mode_prefers_internal_prices() {
        let catalog = InMemoryPartCatalog::new();
        let a = catalog
            .insert_part(
                Part::new("A")
                    .unwrap()
                    .with_internal_price_breaks(breaks(dec!(1.25))),
            )
            .unwrap();
        catalog
            .add_supplier_part(SupplierPart::new(a, "Acme", "A").with_price_breaks(breaks(dec!(9))))
            .unwrap();
        let p = assembly(&catalog, "P", &[(a, dec!(2))]);

        let history = FixedHistory::default();
        let pricer = BomPricer::new(&catalog, &history);
        assert_eq!(
            pricer.bom_price_range(p, dec!(1), BomPricingMode::internal()).unwrap(),
            Some(PriceRange::single(dec!(2.5)))
        );
        assert_eq!(
            pricer.bom_price_range(p, dec!(1), BomPricingMode::market()).unwrap(),
            Some(PriceRange::single(dec!(18)))
        );
    }

    #[test]
    fn purchase_mode_uses_stock_history() {
        let catalog = InMemoryPartCatalog::new();
        let a = bought(&catalog, "A", dec!(9));
        let b = bought(&catalog, "B", dec!(4));
        let p = assembly(&catalog, "P", &[(a, dec!(1)), (b, dec!(1))]);

        let history = FixedHistory(vec![(a, dec!(2)), (a, dec!(3))]);
        let pricer = BomPricer::new(&catalog, &history);
        let range = pricer.bom_price_range(p, dec!(2), BomPricingMode::purchase()).unwrap().unwrap();
        // A from history: 2×2 .. 3×2; B falls back to its supplier: 4×2.
        assert_eq!(range, PriceRange::new(dec!(12), dec!(14)));
    }

    /// A catalog that hands back whatever BOM it was given, cycles included.
    struct CyclicCatalog {
        inner: InMemoryPartCatalog,
        extra: Vec<BomItem>,
    }

    impl PartCatalog for CyclicCatalog {
        fn part(&self, id: PartId) -> Result<Option<Part>, CatalogError> {
            self.inner.part(id)
        }
        fn supplier_part(
            &self,
            id: inventree_core::SupplierPartId,
        ) -> Result<Option<SupplierPart>, CatalogError> {
            self.inner.supplier_part(id)
        }
        fn supplier_parts(&self, part: PartId) -> Result<Vec<SupplierPart>, CatalogError> {
            self.inner.supplier_parts(part)
        }
        fn bom_items(&self, part: PartId) -> Result<Vec<BomItem>, CatalogError> {
            let mut lines = self.inner.bom_items(part)?;
            lines.extend(self.extra.iter().filter(|l| l.part == part).cloned());
            Ok(lines)
        }
    }

    #[test]
    fn overflowing_nested_quantities_leave_assembly_unpriced() {
        let catalog = InMemoryPartCatalog::new();
        let leaf = bought(&catalog, "Leaf", dec!(1));
        let mid = assembly(&catalog, "Mid", &[(leaf, dec!(1000000000000000))]);
        let top = assembly(&catalog, "Top", &[(mid, dec!(1000000000000000))]);

        let history = FixedHistory::default();
        let pricer = BomPricer::new(&catalog, &history);
        assert_eq!(
            pricer.bom_price_range(mid, dec!(1), BomPricingMode::market()).unwrap(),
            Some(PriceRange::single(dec!(1000000000000000)))
        );
        assert_eq!(
            pricer.bom_price_range(top, dec!(1000000000), BomPricingMode::market()).unwrap(),
            None
        );
    }

    #[test]
    fn cycles_are_skipped_not_followed() {
        let inner = InMemoryPartCatalog::new();
        let leaf = bought(&inner, "Leaf", dec!(1));
        let child = assembly(&inner, "Child", &[(leaf, dec!(1))]);
        let top = assembly(&inner, "Top", &[(child, dec!(1))]);
        let back_edge = BomItem::new(child, top, dec!(1)).unwrap();
        let mut self_edge = BomItem::new(top, child, dec!(1)).unwrap();
        self_edge.sub_part = top;

        let catalog = CyclicCatalog {
            inner,
            extra: vec![back_edge, self_edge],
        };
        let history = FixedHistory::default();
        let pricer = BomPricer::new(&catalog, &history);
        let range = pricer.bom_price_range(top, dec!(1), BomPricingMode::market()).unwrap();
        assert_eq!(range, Some(PriceRange::single(dec!(1))));
    }
}
