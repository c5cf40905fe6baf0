//! In-memory stock ledger: purchase orders and the stock they produced.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rust_decimal::Decimal;
use thiserror::Error;

use inventree_core::{DomainError, PartId, PurchaseOrderId, PurchaseOrderLineId, StockItemId, SupplierPartId};
use inventree_parts::{CatalogError, PartCatalog, PurchaseHistory, StockLevels};

use crate::item::StockItem;
use crate::order::{PurchaseOrder, PurchaseOrderStatus};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StockError {
    #[error("unknown purchase order {0}")]
    UnknownOrder(PurchaseOrderId),

    #[error("unknown purchase order line {0}")]
    UnknownLine(PurchaseOrderLineId),

    #[error("unknown supplier part {0}")]
    UnknownSupplierPart(SupplierPartId),

    #[error("unknown stock item {0}")]
    UnknownItem(StockItemId),

    #[error("{0}")]
    Invalid(#[from] DomainError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("stock storage failure: {0}")]
    Storage(String),
}

#[derive(Debug, Default)]
struct LedgerState {
    orders: HashMap<PurchaseOrderId, PurchaseOrder>,
    items: Vec<StockItem>,
}

pub struct StockLedger {
    catalog: Arc<dyn PartCatalog>,
    inner: RwLock<LedgerState>,
}

impl core::fmt::Debug for StockLedger {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StockLedger").finish_non_exhaustive()
    }
}

impl StockLedger {
    pub fn new(catalog: Arc<dyn PartCatalog>) -> Self {
        Self {
            catalog,
            inner: RwLock::new(LedgerState::default()),
        }
    }

    pub fn catalog(&self) -> &Arc<dyn PartCatalog> {
        &self.catalog
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, LedgerState>, StockError> {
        self.inner
            .read()
            .map_err(|_| StockError::Storage("ledger lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, LedgerState>, StockError> {
        self.inner
            .write()
            .map_err(|_| StockError::Storage("ledger lock poisoned".to_string()))
    }

    pub fn add_order(&self, order: PurchaseOrder) -> Result<PurchaseOrderId, StockError> {
        for line in &order.lines {
            if self.catalog.supplier_part(line.part)?.is_none() {
                return Err(StockError::UnknownSupplierPart(line.part));
            }
        }
        let id = order.id;
        self.write()?.orders.insert(id, order);
        Ok(id)
    }

    pub fn order(&self, id: PurchaseOrderId) -> Result<Option<PurchaseOrder>, StockError> {
        Ok(self.read()?.orders.get(&id).cloned())
    }

    /// Store a stock item as-is (imports, fixtures, legacy records).
    pub fn insert_item(&self, item: StockItem) -> Result<StockItemId, StockError> {
        let id = item.id;
        let mut state = self.write()?;
        state.items.retain(|i| i.id != id);
        state.items.push(item);
        Ok(id)
    }

    pub fn item(&self, id: StockItemId) -> Result<Option<StockItem>, StockError> {
        Ok(self.read()?.items.iter().find(|i| i.id == id).cloned())
    }

    pub fn items(&self) -> Result<Vec<StockItem>, StockError> {
        Ok(self.read()?.items.clone())
    }

    /// Overwrite the purchase price of an existing stock item.
    pub fn set_purchase_price(&self, id: StockItemId, price: Option<Decimal>) -> Result<(), StockError> {
        let mut state = self.write()?;
        let item = state
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(StockError::UnknownItem(id))?;
        item.purchase_price = price;
        Ok(())
    }

    /// Receive `packs` packs against a purchase order line into stock.
    ///
    /// The new stock item holds `packs × pack_size` base units, priced at the
    /// line's pack price divided by the pack size.
    pub fn receive_line(
        &self,
        order_id: PurchaseOrderId,
        line_id: PurchaseOrderLineId,
        packs: Decimal,
    ) -> Result<StockItem, StockError> {
        if packs <= Decimal::ZERO {
            return Err(DomainError::validation("received quantity must be positive").into());
        }

        let mut state = self.write()?;
        let order = state
            .orders
            .get_mut(&order_id)
            .ok_or(StockError::UnknownOrder(order_id))?;
        if order.status == PurchaseOrderStatus::Cancelled {
            return Err(DomainError::invariant("cannot receive against a cancelled order").into());
        }
        let line = order
            .lines
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or(StockError::UnknownLine(line_id))?;
        if packs > line.remaining() {
            return Err(DomainError::validation(format!(
                "cannot receive {packs} packs, only {} outstanding",
                line.remaining()
            ))
            .into());
        }

        let supplier_part = self
            .catalog
            .supplier_part(line.part)?
            .ok_or(StockError::UnknownSupplierPart(line.part))?;

        let quantity = packs
            .checked_mul(supplier_part.pack_size)
            .ok_or_else(|| DomainError::validation("received quantity is too large"))?;
        let mut item = StockItem::new(supplier_part.part, quantity)
            .from_purchase(order_id, supplier_part.id)
            .from_line(line_id);
        item.purchase_price = line
            .purchase_price
            .and_then(|p| supplier_part.unit_price(p))
            .map(|d| d.normalize());

        line.received += packs;
        order.status = if order.is_fully_received() {
            PurchaseOrderStatus::Complete
        } else {
            PurchaseOrderStatus::Placed
        };

        tracing::debug!(
            order = %order_id,
            line = %line_id,
            quantity = %item.quantity,
            "received purchase order line"
        );
        state.items.push(item.clone());
        Ok(item)
    }
}

impl PurchaseHistory for StockLedger {
    fn purchase_prices(&self, part: PartId) -> Result<Vec<Decimal>, CatalogError> {
        let state = self
            .inner
            .read()
            .map_err(|_| CatalogError::Storage("ledger lock poisoned".to_string()))?;
        Ok(state
            .items
            .iter()
            .filter(|i| i.part == part)
            .filter_map(|i| i.purchase_price)
            .collect())
    }
}

impl StockLevels for StockLedger {
    fn in_stock(&self, part: PartId) -> Result<Decimal, CatalogError> {
        let state = self
            .inner
            .read()
            .map_err(|_| CatalogError::Storage("ledger lock poisoned".to_string()))?;
        Ok(state
            .items
            .iter()
            .filter(|i| i.part == part)
            .map(|i| i.quantity)
            .sum())
    }
}
