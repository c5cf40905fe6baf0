//! Data migrations over stock records.
//!
//! Unlike schema changes these rewrite existing values. Each migration runs
//! at most once per `MigrationRunner`.

use std::collections::BTreeSet;
use std::sync::Mutex;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::ledger::{StockError, StockLedger};

/// A named, one-shot rewrite of stored stock data.
pub trait DataMigration: Send + Sync {
    fn name(&self) -> &'static str;

    /// Apply the migration, returning the number of records changed.
    fn apply(&self, ledger: &StockLedger) -> Result<usize, StockError>;
}

/// Correct stock items whose purchase price was stored per pack.
///
/// Older releases copied a purchase order line's pack price straight onto the
/// received stock item, skipping the division by the supplier part's pack
/// size. An item is corrected when it was purchased against an order, its
/// supplier part has a pack size other than 1, and its stored price still
/// equals the price on the matching order line. Items that record their
/// receiving line are compared against that line only; older items against
/// every line of the order for the same supplier part.
pub fn fix_purchase_price(ledger: &StockLedger) -> Result<usize, StockError> {
    let mut updated = 0;

    for item in ledger.items()? {
        let (Some(order_id), Some(sp_id), Some(price)) =
            (item.purchase_order, item.supplier_part, item.purchase_price)
        else {
            continue;
        };

        let Some(supplier_part) = ledger.catalog().supplier_part(sp_id)? else {
            continue;
        };
        if supplier_part.pack_size == Decimal::ONE || supplier_part.pack_size <= Decimal::ZERO {
            continue;
        }

        let Some(order) = ledger.order(order_id)? else {
            continue;
        };

        let matches_line = order
            .lines
            .iter()
            .filter(|line| item.purchase_order_line.is_none_or(|id| id == line.id))
            .any(|line| line.part == sp_id && line.purchase_price == Some(price));
        if !matches_line {
            continue;
        }

        let Some(corrected) = supplier_part.unit_price(price) else {
            tracing::warn!(item = %item.id, "purchase price correction overflowed, skipping");
            continue;
        };
        ledger.set_purchase_price(item.id, Some(corrected.normalize()))?;
        updated += 1;
    }

    if updated > 0 {
        tracing::info!("Corrected purchase_price field for {updated} stock items.");
    }

    Ok(updated)
}

/// Migration wrapper around [`fix_purchase_price`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FixPurchasePrice;

impl FixPurchasePrice {
    pub const NAME: &'static str = "stock.fix_purchase_price";
}

impl DataMigration for FixPurchasePrice {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn apply(&self, ledger: &StockLedger) -> Result<usize, StockError> {
        fix_purchase_price(ledger)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub name: &'static str,
    pub updated: usize,
}

/// Runs registered data migrations in order, remembering which have run.
pub struct MigrationRunner {
    migrations: Vec<Box<dyn DataMigration>>,
    applied: Mutex<BTreeSet<&'static str>>,
}

impl MigrationRunner {
    pub fn new() -> Self {
        Self {
            migrations: Vec::new(),
            applied: Mutex::new(BTreeSet::new()),
        }
    }

    /// Runner with every built-in stock migration registered.
    pub fn with_builtin() -> Self {
        Self::new().register(FixPurchasePrice)
    }

    pub fn register(mut self, migration: impl DataMigration + 'static) -> Self {
        self.migrations.push(Box::new(migration));
        self
    }

    pub fn applied(&self) -> Vec<&'static str> {
        match self.applied.lock() {
            Ok(applied) => applied.iter().copied().collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Apply the migration called `name` unless it has already run.
    ///
    /// Returns `None` for an unregistered name, and a report with zero
    /// updates when the migration was applied earlier.
    pub fn run_once(&self, name: &str, ledger: &StockLedger) -> Result<Option<MigrationReport>, StockError> {
        let Some(migration) = self.migrations.iter().find(|m| m.name() == name) else {
            return Ok(None);
        };
        let name = migration.name();

        let mut applied = self
            .applied
            .lock()
            .map_err(|_| StockError::Storage("migration registry lock poisoned".to_string()))?;
        if applied.contains(name) {
            tracing::debug!(migration = name, "data migration already applied");
            return Ok(Some(MigrationReport { name, updated: 0 }));
        }

        let updated = migration.apply(ledger)?;
        tracing::debug!(migration = name, updated, "data migration applied");
        applied.insert(name);
        Ok(Some(MigrationReport { name, updated }))
    }

    /// Apply every migration that has not run yet.
    pub fn run_pending(&self, ledger: &StockLedger) -> Result<Vec<MigrationReport>, StockError> {
        let mut applied = self
            .applied
            .lock()
            .map_err(|_| StockError::Storage("migration registry lock poisoned".to_string()))?;

        let mut reports = Vec::new();
        for migration in &self.migrations {
            let name = migration.name();
            if applied.contains(name) {
                continue;
            }
            let updated = migration.apply(ledger)?;
            tracing::debug!(migration = name, updated, "data migration applied");
            applied.insert(name);
            reports.push(MigrationReport { name, updated });
        }
        Ok(reports)
    }
}

impl Default for MigrationRunner {
    fn default() -> Self {
        Self::with_builtin()
    }
}
