//! Catalog storage abstractions.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use rust_decimal::Decimal;
use thiserror::Error;

use inventree_core::{DomainError, PartId, SupplierPartId};

use crate::{BomItem, Part, SupplierPart};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("unknown part {0}")]
    UnknownPart(PartId),

    #[error("unknown supplier part {0}")]
    UnknownSupplierPart(SupplierPartId),

    #[error("part {0} cannot be added to its own BOM")]
    BomSelfReference(PartId),

    #[error("adding {child} to the BOM of {parent} would create a cycle")]
    BomCycle { parent: PartId, child: PartId },

    #[error("{0}")]
    Invalid(#[from] DomainError),

    #[error("catalog storage failure: {0}")]
    Storage(String),
}

impl From<CatalogError> for DomainError {
    fn from(value: CatalogError) -> Self {
        match value {
            CatalogError::UnknownPart(_) | CatalogError::UnknownSupplierPart(_) => {
                DomainError::not_found()
            }
            CatalogError::BomSelfReference(_) | CatalogError::BomCycle { .. } => {
                DomainError::invariant(value.to_string())
            }
            CatalogError::Invalid(e) => e,
            CatalogError::Storage(msg) => DomainError::conflict(msg),
        }
    }
}

/// Read access to parts, their suppliers and their BOM.
///
/// BOM graphs returned by implementations must be acyclic.
pub trait PartCatalog: Send + Sync {
    fn part(&self, id: PartId) -> Result<Option<Part>, CatalogError>;
    fn supplier_part(&self, id: SupplierPartId) -> Result<Option<SupplierPart>, CatalogError>;
    fn supplier_parts(&self, part: PartId) -> Result<Vec<SupplierPart>, CatalogError>;
    fn bom_items(&self, part: PartId) -> Result<Vec<BomItem>, CatalogError>;
}

/// Historical purchase prices (per base unit) of stock received for a part.
pub trait PurchaseHistory: Send + Sync {
    fn purchase_prices(&self, part: PartId) -> Result<Vec<Decimal>, CatalogError>;
}

/// Quantity currently held in stock for a part.
pub trait StockLevels: Send + Sync {
    fn in_stock(&self, part: PartId) -> Result<Decimal, CatalogError>;
}

impl<S> PartCatalog for Arc<S>
where
    S: PartCatalog + ?Sized,
{
    fn part(&self, id: PartId) -> Result<Option<Part>, CatalogError> {
        (**self).part(id)
    }

    fn supplier_part(&self, id: SupplierPartId) -> Result<Option<SupplierPart>, CatalogError> {
        (**self).supplier_part(id)
    }

    fn supplier_parts(&self, part: PartId) -> Result<Vec<SupplierPart>, CatalogError> {
        (**self).supplier_parts(part)
    }

    fn bom_items(&self, part: PartId) -> Result<Vec<BomItem>, CatalogError> {
        (**self).bom_items(part)
    }
}

impl<S> PurchaseHistory for Arc<S>
where
    S: PurchaseHistory + ?Sized,
{
    fn purchase_prices(&self, part: PartId) -> Result<Vec<Decimal>, CatalogError> {
        (**self).purchase_prices(part)
    }
}

impl<S> StockLevels for Arc<S>
where
    S: StockLevels + ?Sized,
{
    fn in_stock(&self, part: PartId) -> Result<Decimal, CatalogError> {
        (**self).in_stock(part)
    }
}

#[derive(Debug, Default)]
struct CatalogState {
    parts: HashMap<PartId, Part>,
    supplier_parts: Vec<SupplierPart>,
    bom: Vec<BomItem>,
}

impl CatalogState {
    /// True if `target` is reachable from `from` by walking BOM lines downwards.
    fn bom_reaches(&self, from: PartId, target: PartId) -> bool {
        let mut stack = vec![from];
        let mut seen = HashSet::new();
        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            stack.extend(
                self.bom
                    .iter()
                    .filter(|line| line.part == current)
                    .map(|line| line.sub_part),
            );
        }
        false
    }
}

/// In-memory catalog for tests/dev (also the write side used by seeding).
#[derive(Debug, Default)]
pub struct InMemoryPartCatalog {
    inner: RwLock<CatalogState>,
}

impl InMemoryPartCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, CatalogState>, CatalogError> {
        self.inner
            .read()
            .map_err(|_| CatalogError::Storage("catalog lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, CatalogState>, CatalogError> {
        self.inner
            .write()
            .map_err(|_| CatalogError::Storage("catalog lock poisoned".to_string()))
    }

    /// Insert or replace a part.
    pub fn insert_part(&self, part: Part) -> Result<PartId, CatalogError> {
        let id = part.id;
        self.write()?.parts.insert(id, part);
        Ok(id)
    }

    pub fn add_supplier_part(&self, supplier_part: SupplierPart) -> Result<SupplierPartId, CatalogError> {
        supplier_part.validate()?;
        let mut state = self.write()?;
        if !state.parts.contains_key(&supplier_part.part) {
            return Err(CatalogError::UnknownPart(supplier_part.part));
        }
        let id = supplier_part.id;
        state.supplier_parts.retain(|sp| sp.id != id);
        state.supplier_parts.push(supplier_part);
        Ok(id)
    }

    /// Add a BOM line, rejecting lines that would make the BOM cyclic.
    pub fn add_bom_item(&self, item: BomItem) -> Result<(), CatalogError> {
        if item.part == item.sub_part {
            return Err(CatalogError::BomSelfReference(item.part));
        }
        item.validate()?;

        let mut state = self.write()?;
        for id in [item.part, item.sub_part] {
            if !state.parts.contains_key(&id) {
                return Err(CatalogError::UnknownPart(id));
            }
        }
        if state.bom_reaches(item.sub_part, item.part) {
            return Err(CatalogError::BomCycle {
                parent: item.part,
                child: item.sub_part,
            });
        }

        if let Some(parent) = state.parts.get_mut(&item.part) {
            parent.assembly = true;
        }
        state.bom.retain(|line| line.id != item.id);
        state.bom.push(item);
        Ok(())
    }

    pub fn parts(&self) -> Result<Vec<Part>, CatalogError> {
        let mut parts: Vec<Part> = self.read()?.parts.values().cloned().collect();
        parts.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(parts)
    }
}

impl PartCatalog for InMemoryPartCatalog {
    fn part(&self, id: PartId) -> Result<Option<Part>, CatalogError> {
        Ok(self.read()?.parts.get(&id).cloned())
    }

    fn supplier_part(&self, id: SupplierPartId) -> Result<Option<SupplierPart>, CatalogError> {
        Ok(self
            .read()?
            .supplier_parts
            .iter()
            .find(|sp| sp.id == id)
            .cloned())
    }

    fn supplier_parts(&self, part: PartId) -> Result<Vec<SupplierPart>, CatalogError> {
        Ok(self
            .read()?
            .supplier_parts
            .iter()
            .filter(|sp| sp.part == part)
            .cloned()
            .collect())
    }

    fn bom_items(&self, part: PartId) -> Result<Vec<BomItem>, CatalogError> {
        Ok(self
            .read()?
            .bom
            .iter()
            .filter(|line| line.part == part)
            .cloned()
            .collect())
    }
}
