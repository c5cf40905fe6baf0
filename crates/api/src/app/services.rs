//! Service wiring: the in-memory catalog, stock ledger and the engines that
//! read them.

use std::fs;
use std::sync::Arc;

use anyhow::Context;
use rust_decimal::Decimal;
use serde::Deserialize;

use inventree_bom::{BomExport, BomExportOptions, ExportError, export_bom};
use inventree_core::{Currency, PartId};
use inventree_parts::{CatalogSeed, InMemoryPartCatalog};
use inventree_pricing::{PricingContext, PricingError, PricingService, PricingSettings};
use inventree_stock::{FixPurchasePrice, MigrationReport, MigrationRunner, StockError, StockLedger, StockSeed};

use crate::config::AppConfig;

/// A combined catalog + stock fixture file.
#[derive(Debug, Default, Deserialize)]
pub struct Fixtures {
    #[serde(flatten)]
    pub catalog: CatalogSeed,
    #[serde(flatten)]
    pub stock: StockSeed,
}

pub struct AppServices {
    pub catalog: Arc<InMemoryPartCatalog>,
    pub ledger: Arc<StockLedger>,
    pub pricing: PricingService,
    pub migrations: MigrationRunner,
}

impl AppServices {
    pub fn new(settings: PricingSettings) -> Self {
        let catalog = Arc::new(InMemoryPartCatalog::new());
        let ledger = Arc::new(StockLedger::new(catalog.clone()));
        let pricing = PricingService::new(catalog.clone(), ledger.clone(), settings);

        Self {
            catalog,
            ledger,
            pricing,
            migrations: MigrationRunner::with_builtin(),
        }
    }

    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let services = Self::new(PricingSettings::from(&config.pricing));

        if let Some(path) = &config.data.seed_file {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read seed file {}", path.display()))?;
            let records = services.load_fixtures(&raw)?;
            tracing::info!(path = %path.display(), records, "loaded seed data");
        }

        Ok(services)
    }

    /// Load a JSON fixture: catalog records first, then orders and stock.
    pub fn load_fixtures(&self, raw: &str) -> anyhow::Result<usize> {
        let fixtures: Fixtures = serde_json::from_str(raw).context("invalid fixture JSON")?;
        let parts = fixtures.catalog.apply(&self.catalog)?;
        let stock = fixtures.stock.apply(&self.ledger)?;
        Ok(parts + stock)
    }

    pub fn pricing_context(
        &self,
        part: PartId,
        quantity: Decimal,
        currency: Option<Currency>,
    ) -> Result<PricingContext, PricingError> {
        self.pricing.context(part, quantity, currency)
    }

    pub fn export_bom(&self, part: PartId, options: &BomExportOptions) -> Result<BomExport, ExportError> {
        export_bom(
            self.catalog.as_ref(),
            self.ledger.as_ref(),
            self.ledger.as_ref(),
            part,
            options,
        )
    }

    /// Apply the pack-size purchase price correction if it has not run yet.
    pub fn fix_purchase_price(&self) -> Result<usize, StockError> {
        let report = self.migrations.run_once(FixPurchasePrice::NAME, &self.ledger)?;
        Ok(report.map_or(0, |r| r.updated))
    }

    pub fn run_migrations(&self) -> Result<Vec<MigrationReport>, StockError> {
        self.migrations.run_pending(&self.ledger)
    }

    pub fn applied_migrations(&self) -> Vec<&'static str> {
        self.migrations.applied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_load_catalog_then_stock() {
        let services = AppServices::new(PricingSettings::default());
        let part = PartId::new();
        let raw = serde_json::json!({
            "parts": [{"id": part, "name": "Resistor"}],
            "supplier_parts": [{"part": part, "supplier": "Mouser", "sku": "R-1"}],
            "stock_items": [{"part": part, "quantity": "5", "created_at": "2023-02-20T00:25:00Z"}],
        })
        .to_string();

        assert_eq!(services.load_fixtures(&raw).unwrap(), 3);
        assert_eq!(services.catalog.parts().unwrap().len(), 1);
        assert_eq!(services.ledger.items().unwrap().len(), 1);
    }

    #[test]
    fn bad_fixture_is_an_error() {
        let services = AppServices::new(PricingSettings::default());
        assert!(services.load_fixtures("{ not json").is_err());
    }
}
