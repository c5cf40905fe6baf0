//! JSON fixtures for populating a catalog.

use serde::{Deserialize, Serialize};

use crate::{BomItem, CatalogError, InMemoryPartCatalog, Part, SupplierPart};

/// Catalog contents as loaded from a fixture file.
///
/// Parts are inserted first, then supplier parts, then BOM lines in file
/// order, so a fixture containing a BOM cycle is rejected part-way.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(default)]
    pub supplier_parts: Vec<SupplierPart>,
    #[serde(default)]
    pub bom_items: Vec<BomItem>,
}

impl CatalogSeed {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn apply(self, catalog: &InMemoryPartCatalog) -> Result<usize, CatalogError> {
        let mut count = 0;
        for part in self.parts {
            catalog.insert_part(part)?;
            count += 1;
        }
        for sp in self.supplier_parts {
            catalog.add_supplier_part(sp)?;
            count += 1;
        }
        for line in self.bom_items {
            catalog.add_bom_item(line)?;
            count += 1;
        }
        tracing::debug!(records = count, "catalog seeded");
        Ok(count)
    }
}
