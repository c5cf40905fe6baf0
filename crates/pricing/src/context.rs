//! Pricing context: every price facet of a part at a given quantity.

use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use inventree_core::{Currency, DomainError, PartId, PriceRange, effective_quantity, round_price};
use inventree_parts::{CatalogError, Part, PartCatalog, PurchaseHistory};

use crate::bom::{BomPricer, BomPricingMode};
use crate::internal::{internal_price, list_price};
use crate::supplier::supplier_price_range;

/// Facet keys emitted in a [`PricingContext`].
pub mod facet {
    pub const MIN_TOTAL_BUY_PRICE: &str = "min_total_buy_price";
    pub const MIN_UNIT_BUY_PRICE: &str = "min_unit_buy_price";
    pub const MAX_TOTAL_BUY_PRICE: &str = "max_total_buy_price";
    pub const MAX_UNIT_BUY_PRICE: &str = "max_unit_buy_price";

    pub const MIN_TOTAL_BOM_PRICE: &str = "min_total_bom_price";
    pub const MIN_UNIT_BOM_PRICE: &str = "min_unit_bom_price";
    pub const MAX_TOTAL_BOM_PRICE: &str = "max_total_bom_price";
    pub const MAX_UNIT_BOM_PRICE: &str = "max_unit_bom_price";

    pub const MIN_TOTAL_BOM_PURCHASE_PRICE: &str = "min_total_bom_purchase_price";
    pub const MIN_UNIT_BOM_PURCHASE_PRICE: &str = "min_unit_bom_purchase_price";
    pub const MAX_TOTAL_BOM_PURCHASE_PRICE: &str = "max_total_bom_purchase_price";
    pub const MAX_UNIT_BOM_PURCHASE_PRICE: &str = "max_unit_bom_purchase_price";

    pub const TOTAL_INTERNAL_PART_PRICE: &str = "total_internal_part_price";
    pub const UNIT_INTERNAL_PART_PRICE: &str = "unit_internal_part_price";

    pub const TOTAL_PART_PRICE: &str = "total_part_price";
    pub const UNIT_PART_PRICE: &str = "unit_part_price";
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PricingError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl From<PricingError> for DomainError {
    fn from(value: PricingError) -> Self {
        match value {
            PricingError::Catalog(e) => e.into(),
        }
    }
}

/// Global pricing settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PricingSettings {
    /// Use internal prices for sub-parts when rolling up BOM prices.
    pub bom_use_internal_price: bool,
}

/// The part a context was built for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartSummary {
    pub id: PartId,
    pub name: String,
    pub full_name: String,
}

impl From<&Part> for PartSummary {
    fn from(part: &Part) -> Self {
        Self {
            id: part.id,
            name: part.name.clone(),
            full_name: part.full_name(),
        }
    }
}

/// Pricing facets for one part at one quantity.
///
/// Only facets with a source are present; a part with no prices at all
/// produces an empty facet map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricingContext {
    pub part: Option<PartSummary>,
    pub quantity: Decimal,
    pub currency: Option<Currency>,
    #[serde(flatten)]
    pub facets: BTreeMap<&'static str, Decimal>,
}

impl PricingContext {
    fn empty(quantity: Decimal) -> Self {
        Self {
            part: None,
            quantity,
            currency: None,
            facets: BTreeMap::new(),
        }
    }

    pub fn get(&self, facet: &str) -> Option<Decimal> {
        self.facets.get(facet).copied()
    }

    pub fn has_prices(&self) -> bool {
        !self.facets.is_empty()
    }

    /// Record a total and its per-unit value, both rounded.
    fn put(&mut self, total_key: &'static str, unit_key: &'static str, total: Decimal) {
        self.facets.insert(total_key, round_price(total));
        if let Some(unit) = total.checked_div(self.quantity) {
            self.facets.insert(unit_key, round_price(unit));
        }
    }

    /// Record both ends of a range, dropping ends that are zero.
    ///
    /// Supplier ends are tested after rounding, so a sub-0.0005 buy price is
    /// dropped. BOM ends are tested as computed and may report `0.000`.
    fn put_range(&mut self, keys: [&'static str; 4], range: PriceRange, zero: ZeroTest) {
        let [min_total, min_unit, max_total, max_unit] = keys;
        if !zero.is_zero(range.min) {
            self.put(min_total, min_unit, range.min);
        }
        if !zero.is_zero(range.max) {
            self.put(max_total, max_unit, range.max);
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum ZeroTest {
    Rounded,
    Exact,
}

impl ZeroTest {
    fn is_zero(self, value: Decimal) -> bool {
        match self {
            Self::Rounded => round_price(value).is_zero(),
            Self::Exact => value.is_zero(),
        }
    }
}

/// Builds pricing contexts over a catalog and its purchase history.
#[derive(Clone)]
pub struct PricingService {
    catalog: Arc<dyn PartCatalog>,
    history: Arc<dyn PurchaseHistory>,
    settings: PricingSettings,
}

impl PricingService {
    pub fn new(
        catalog: Arc<dyn PartCatalog>,
        history: Arc<dyn PurchaseHistory>,
        settings: PricingSettings,
    ) -> Self {
        Self {
            catalog,
            history,
            settings,
        }
    }

    pub fn settings(&self) -> PricingSettings {
        self.settings
    }

    /// Build the pricing context for `quantity` of `part_id`.
    ///
    /// Quantities at or below zero are priced as 1. The currency is echoed
    /// back but otherwise ignored. An unknown part yields a context with no
    /// part and no facets.
    pub fn context(
        &self,
        part_id: PartId,
        quantity: Decimal,
        currency: Option<Currency>,
    ) -> Result<PricingContext, PricingError> {
        let quantity = effective_quantity(quantity);
        let mut ctx = PricingContext::empty(quantity);
        ctx.currency = currency;

        let Some(part) = self.catalog.part(part_id)? else {
            tracing::debug!(part = %part_id, "pricing requested for unknown part");
            return Ok(ctx);
        };
        ctx.part = Some(PartSummary::from(&part));

        if !self.catalog.supplier_parts(part_id)?.is_empty() {
            if let Some(buy) = supplier_price_range(self.catalog.as_ref(), part_id, quantity)? {
                ctx.put_range(
                    [
                        facet::MIN_TOTAL_BUY_PRICE,
                        facet::MIN_UNIT_BUY_PRICE,
                        facet::MAX_TOTAL_BUY_PRICE,
                        facet::MAX_UNIT_BUY_PRICE,
                    ],
                    buy,
                    ZeroTest::Rounded,
                );
            }
        }

        if !self.catalog.bom_items(part_id)?.is_empty() {
            let pricer = BomPricer::new(self.catalog.as_ref(), self.history.as_ref());
            let mode = if self.settings.bom_use_internal_price {
                BomPricingMode::internal()
            } else {
                BomPricingMode::market()
            };

            if let Some(bom) = pricer.bom_price_range(part_id, quantity, mode)? {
                ctx.put_range(
                    [
                        facet::MIN_TOTAL_BOM_PRICE,
                        facet::MIN_UNIT_BOM_PRICE,
                        facet::MAX_TOTAL_BOM_PRICE,
                        facet::MAX_UNIT_BOM_PRICE,
                    ],
                    bom,
                    ZeroTest::Exact,
                );
            }

            if let Some(purchase) = pricer.bom_price_range(part_id, quantity, BomPricingMode::purchase())? {
                ctx.put_range(
                    [
                        facet::MIN_TOTAL_BOM_PURCHASE_PRICE,
                        facet::MIN_UNIT_BOM_PURCHASE_PRICE,
                        facet::MAX_TOTAL_BOM_PURCHASE_PRICE,
                        facet::MAX_UNIT_BOM_PURCHASE_PRICE,
                    ],
                    purchase,
                    ZeroTest::Exact,
                );
            }
        }

        if let Some(price) = internal_price(&part, quantity) {
            ctx.put(
                facet::TOTAL_INTERNAL_PART_PRICE,
                facet::UNIT_INTERNAL_PART_PRICE,
                price,
            );
        }

        if let Some(price) = list_price(&part, quantity) {
            ctx.put(facet::TOTAL_PART_PRICE, facet::UNIT_PART_PRICE, price);
        }

        tracing::debug!(
            part = %part_id,
            quantity = %quantity,
            facets = ctx.facets.len(),
            "pricing context built"
        );
        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inventree_core::MAX_QUANTITY;
    use inventree_parts::{BomItem, InMemoryPartCatalog, PriceBreak, PriceBreaks, SupplierPart};
    use inventree_stock::{PurchaseOrder, PurchaseOrderLine, StockItem, StockLedger, fix_purchase_price};
    use rust_decimal_macros::dec;

    fn breaks(unit: Decimal) -> PriceBreaks {
        vec![PriceBreak::new(dec!(1), unit).unwrap()].into()
    }

    struct World {
        catalog: Arc<InMemoryPartCatalog>,
        ledger: Arc<StockLedger>,
    }

    impl World {
        fn new() -> Self {
            let catalog = Arc::new(InMemoryPartCatalog::new());
            let ledger = Arc::new(StockLedger::new(catalog.clone()));
            Self { catalog, ledger }
        }

        fn service(&self, settings: PricingSettings) -> PricingService {
            PricingService::new(self.catalog.clone(), self.ledger.clone(), settings)
        }

        fn bought(&self, name: &str, unit: Decimal) -> PartId {
            let id = self.catalog.insert_part(Part::new(name).unwrap().purchaseable()).unwrap();
            self.catalog
                .add_supplier_part(SupplierPart::new(id, "Acme", name).with_price_breaks(breaks(unit)))
                .unwrap();
            id
        }
    }

    #[test]
    fn bom_example_from_two_children() {
        let w = World::new();
        let a = w.bought("A", dec!(2.00));
        let b = w.bought("B", dec!(5.00));
        let p = w.catalog.insert_part(Part::new("P").unwrap()).unwrap();
        w.catalog.add_bom_item(BomItem::new(p, a, dec!(3)).unwrap()).unwrap();
        w.catalog.add_bom_item(BomItem::new(p, b, dec!(1)).unwrap()).unwrap();

        let ctx = w.service(PricingSettings::default()).context(p, dec!(2), None).unwrap();
        assert_eq!(ctx.get(facet::MIN_TOTAL_BOM_PRICE), Some(dec!(22.00)));
        assert_eq!(ctx.get(facet::MAX_TOTAL_BOM_PRICE), Some(dec!(22.00)));
        assert_eq!(ctx.get(facet::MIN_UNIT_BOM_PRICE), Some(dec!(11.00)));
        assert_eq!(ctx.get(facet::MAX_UNIT_BOM_PRICE), Some(dec!(11.00)));
        // No purchase history: the purchase pass falls back to supplier prices.
        assert_eq!(ctx.get(facet::MIN_TOTAL_BOM_PURCHASE_PRICE), Some(dec!(22)));
        // P has no suppliers of its own.
        assert_eq!(ctx.get(facet::MIN_TOTAL_BUY_PRICE), None);
    }

    #[test]
    fn part_without_sources_has_no_facets() {
        let w = World::new();
        let p = w.catalog.insert_part(Part::new("Bare").unwrap()).unwrap();
        let ctx = w.service(PricingSettings::default()).context(p, dec!(5), None).unwrap();
        assert!(ctx.part.is_some());
        assert!(!ctx.has_prices());
    }

    #[test]
    fn unknown_part_gives_minimal_context() {
        let w = World::new();
        let ctx = w
            .service(PricingSettings::default())
            .context(PartId::new(), dec!(3), Some(Currency::new("usd")))
            .unwrap();
        assert_eq!(ctx.part, None);
        assert_eq!(ctx.quantity, dec!(3));
        assert_eq!(ctx.currency, Some(Currency::new("USD")));
        assert!(!ctx.has_prices());
    }

    #[test]
    fn non_positive_quantity_is_priced_as_one() {
        let w = World::new();
        let a = w.bought("A", dec!(4));
        let svc = w.service(PricingSettings::default());
        for q in [dec!(0), dec!(-7)] {
            let ctx = svc.context(a, q, None).unwrap();
            assert_eq!(ctx.quantity, Decimal::ONE);
            assert_eq!(ctx.get(facet::MIN_TOTAL_BUY_PRICE), Some(dec!(4)));
            assert_eq!(ctx.get(facet::MIN_UNIT_BUY_PRICE), Some(dec!(4)));
        }
    }

    #[test]
    fn huge_quantity_is_clamped_and_priced() {
        let w = World::new();
        let a = w.bought("A", dec!(10.00));
        let p = w.catalog.insert_part(Part::new("P").unwrap()).unwrap();
        w.catalog.add_bom_item(BomItem::new(p, a, dec!(3)).unwrap()).unwrap();
        let svc = w.service(PricingSettings::default());

        let q = inventree_core::parse_quantity("1e28");
        let ctx = svc.context(a, q, None).unwrap();
        assert_eq!(ctx.quantity, MAX_QUANTITY);
        assert_eq!(ctx.get(facet::MIN_TOTAL_BUY_PRICE), Some(dec!(10000000000)));
        assert_eq!(ctx.get(facet::MIN_UNIT_BUY_PRICE), Some(dec!(10)));

        let ctx = svc.context(p, Decimal::MAX, None).unwrap();
        assert_eq!(ctx.get(facet::MIN_UNIT_BOM_PRICE), Some(dec!(30)));
    }

    #[test]
    fn overflowing_bom_is_left_unpriced() {
        let w = World::new();
        let a = w.bought("A", Decimal::MAX);
        let b = w.bought("B", Decimal::MAX);
        let p = w.catalog.insert_part(Part::new("P").unwrap()).unwrap();
        w.catalog.add_bom_item(BomItem::new(p, a, dec!(1)).unwrap()).unwrap();
        w.catalog.add_bom_item(BomItem::new(p, b, dec!(1)).unwrap()).unwrap();

        let ctx = w.service(PricingSettings::default()).context(p, dec!(1), None).unwrap();
        assert_eq!(ctx.get(facet::MIN_TOTAL_BOM_PRICE), None);
        assert_eq!(ctx.get(facet::MIN_TOTAL_BOM_PURCHASE_PRICE), None);
        assert!(ctx.part.is_some());
    }

    #[test]
    fn supplier_facets_cover_min_and_max() {
        let w = World::new();
        let a = w.bought("A", dec!(1.5));
        w.catalog
            .add_supplier_part(SupplierPart::new(a, "Other", "A2").with_price_breaks(breaks(dec!(2.25))))
            .unwrap();

        let ctx = w.service(PricingSettings::default()).context(a, dec!(3), None).unwrap();
        assert_eq!(ctx.get(facet::MIN_TOTAL_BUY_PRICE), Some(dec!(4.5)));
        assert_eq!(ctx.get(facet::MIN_UNIT_BUY_PRICE), Some(dec!(1.5)));
        assert_eq!(ctx.get(facet::MAX_TOTAL_BUY_PRICE), Some(dec!(6.75)));
        assert_eq!(ctx.get(facet::MAX_UNIT_BUY_PRICE), Some(dec!(2.25)));
    }

    #[test]
    fn zero_supplier_price_is_omitted() {
        let w = World::new();
        let free = w.bought("Sample", dec!(0));
        let ctx = w.service(PricingSettings::default()).context(free, dec!(1), None).unwrap();
        assert_eq!(ctx.get(facet::MIN_TOTAL_BUY_PRICE), None);
        assert_eq!(ctx.get(facet::MAX_TOTAL_BUY_PRICE), None);
    }

    #[test]
    fn tiny_bom_total_is_reported_as_zero_but_tiny_buy_price_is_not() {
        let w = World::new();
        let a = w.bought("A", dec!(0.0004));
        let p = w.catalog.insert_part(Part::new("P").unwrap()).unwrap();
        w.catalog.add_bom_item(BomItem::new(p, a, dec!(1)).unwrap()).unwrap();
        let svc = w.service(PricingSettings::default());

        let part = svc.context(a, dec!(1), None).unwrap();
        assert_eq!(part.get(facet::MIN_TOTAL_BUY_PRICE), None);

        let assembly = svc.context(p, dec!(1), None).unwrap();
        assert_eq!(assembly.get(facet::MIN_TOTAL_BOM_PRICE), Some(dec!(0)));
        assert_eq!(assembly.get(facet::MAX_UNIT_BOM_PRICE), Some(dec!(0)));
        assert_eq!(assembly.get(facet::MIN_TOTAL_BOM_PURCHASE_PRICE), Some(dec!(0)));
    }

    #[test]
    fn internal_and_list_prices_are_reported() {
        let w = World::new();
        let p = w
            .catalog
            .insert_part(
                Part::new("Kit")
                    .unwrap()
                    .with_internal_price_breaks(breaks(dec!(0.3333)))
                    .with_sale_price_breaks(breaks(dec!(1.1))),
            )
            .unwrap();

        let ctx = w.service(PricingSettings::default()).context(p, dec!(3), None).unwrap();
        assert_eq!(ctx.get(facet::TOTAL_INTERNAL_PART_PRICE), Some(dec!(1.000)));
        assert_eq!(ctx.get(facet::UNIT_INTERNAL_PART_PRICE), Some(dec!(0.333)));
        assert_eq!(ctx.get(facet::TOTAL_PART_PRICE), Some(dec!(3.3)));
        assert_eq!(ctx.get(facet::UNIT_PART_PRICE), Some(dec!(1.1)));
    }

    #[test]
    fn internal_setting_switches_bom_source() {
        let w = World::new();
        let a = w.bought("A", dec!(10));
        w.catalog
            .insert_part(
                w.catalog
                    .part(a)
                    .unwrap()
                    .unwrap()
                    .with_internal_price_breaks(breaks(dec!(6))),
            )
            .unwrap();
        let p = w.catalog.insert_part(Part::new("P").unwrap()).unwrap();
        w.catalog.add_bom_item(BomItem::new(p, a, dec!(1)).unwrap()).unwrap();

        let market = w.service(PricingSettings::default()).context(p, dec!(1), None).unwrap();
        let internal = w
            .service(PricingSettings { bom_use_internal_price: true })
            .context(p, dec!(1), None)
            .unwrap();
        assert_eq!(market.get(facet::MIN_TOTAL_BOM_PRICE), Some(dec!(10)));
        assert_eq!(internal.get(facet::MIN_TOTAL_BOM_PRICE), Some(dec!(6)));
        // The purchase pass never uses internal prices.
        assert_eq!(internal.get(facet::MIN_TOTAL_BOM_PURCHASE_PRICE), Some(dec!(10)));
    }

    #[test]
    fn purchase_facet_reflects_corrected_stock_prices() {
        let w = World::new();
        let a = w.catalog.insert_part(Part::new("A").unwrap().purchaseable()).unwrap();
        let sp = w
            .catalog
            .add_supplier_part(
                SupplierPart::new(a, "Acme", "A-5")
                    .with_pack_size(dec!(5))
                    .with_price_breaks(breaks(dec!(3))),
            )
            .unwrap();
        let p = w.catalog.insert_part(Part::new("P").unwrap()).unwrap();
        w.catalog.add_bom_item(BomItem::new(p, a, dec!(1)).unwrap()).unwrap();

        // Legacy stock: pack price 10.00 stored without dividing by pack size 5.
        let line = PurchaseOrderLine::new(sp, dec!(1), Some(dec!(10.00))).unwrap();
        let order = w
            .ledger
            .add_order(PurchaseOrder::new("PO-1", "Acme").with_line(line))
            .unwrap();
        w.ledger
            .insert_item(StockItem::new(a, dec!(5)).from_purchase(order, sp).with_purchase_price(dec!(10.00)))
            .unwrap();

        let svc = w.service(PricingSettings::default());
        let before = svc.context(p, dec!(1), None).unwrap();
        assert_eq!(before.get(facet::MIN_TOTAL_BOM_PURCHASE_PRICE), Some(dec!(10)));

        assert_eq!(fix_purchase_price(&w.ledger).unwrap(), 1);

        let after = svc.context(p, dec!(1), None).unwrap();
        assert_eq!(after.get(facet::MIN_TOTAL_BOM_PURCHASE_PRICE), Some(dec!(2.00)));
        assert_eq!(after.get(facet::MIN_TOTAL_BOM_PRICE), Some(dec!(3)));
    }

    #[test]
    fn context_serializes_facets_flat() {
        let w = World::new();
        let a = w.bought("A", dec!(2));
        let ctx = w.service(PricingSettings::default()).context(a, dec!(2), None).unwrap();
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["min_total_buy_price"], "4");
        assert_eq!(json["min_unit_buy_price"], "2");
        assert_eq!(json["quantity"], "2");
        assert_eq!(json["part"]["name"], "A");
        assert!(json.get("min_total_bom_price").is_none());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 200,
                ..ProptestConfig::default()
            })]

            /// Property: every unit facet is its total divided by the effective quantity.
            #[test]
            fn unit_is_total_over_quantity(
                unit_cents in 1i64..100_000,
                line_qty in 1i64..50,
                q_mantissa in prop_oneof![-500i64..=0, 10i64..5_000],
            ) {
                let w = World::new();
                let a = w.bought("A", Decimal::new(unit_cents, 2));
                let p = w.catalog.insert_part(Part::new("P").unwrap()).unwrap();
                w.catalog.add_bom_item(BomItem::new(p, a, Decimal::from(line_qty)).unwrap()).unwrap();

                let q = Decimal::new(q_mantissa, 1);
                let ctx = w.service(PricingSettings::default()).context(p, q, None).unwrap();
                let eq = effective_quantity(q);
                prop_assert_eq!(ctx.quantity, eq);

                let expected_total = Decimal::new(unit_cents, 2) * Decimal::from(line_qty) * eq;
                prop_assert_eq!(ctx.get(facet::MIN_TOTAL_BOM_PRICE), Some(round_price(expected_total)));
                prop_assert_eq!(
                    ctx.get(facet::MIN_UNIT_BOM_PRICE),
                    Some(round_price(expected_total / eq))
                );
            }

            /// Property: building a context twice over unchanged data is identical.
            #[test]
            fn context_is_idempotent(unit_cents in 0i64..100_000, q in 1i64..1_000) {
                let w = World::new();
                let a = w.bought("A", Decimal::new(unit_cents, 2));
                let svc = w.service(PricingSettings::default());
                let first = svc.context(a, Decimal::from(q), None).unwrap();
                let second = svc.context(a, Decimal::from(q), None).unwrap();
                prop_assert_eq!(first, second);
            }
        }
    }
}
