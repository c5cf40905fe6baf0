//! Flattened BOM export.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use rust_decimal::Decimal;

use inventree_core::{PartId, round_price, str2bool};
use inventree_parts::{BomItem, CatalogError, Part, PartCatalog, PurchaseHistory, StockLevels, SupplierPart};
use inventree_pricing::{BomPricer, BomPricingMode};

use crate::format::BomFormat;
use crate::table::{Table, TableError};

/// A rendered file ready to be served as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BomExport {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("unknown part {0}")]
    UnknownPart(PartId),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Encode(#[from] TableError),
}

/// What to include in an export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BomExportOptions {
    pub format: BomFormat,
    /// Descend into sub-assemblies.
    pub cascade: bool,
    /// Deepest level to descend to when cascading; `None` is unlimited.
    pub max_levels: Option<u32>,
    pub parameter_data: bool,
    pub stock_data: bool,
    pub supplier_data: bool,
    pub manufacturer_data: bool,
    pub pricing_data: bool,
    pub substitute_part_data: bool,
}

impl BomExportOptions {
    /// Build options from raw query parameters.
    ///
    /// Unknown formats fall back to CSV; `levels` that do not parse or are not
    /// positive mean "no limit". Flags accept the usual truthy spellings.
    pub fn from_query(params: &BTreeMap<String, String>) -> Self {
        let flag = |name: &str| params.get(name).is_some_and(|v| str2bool(v));
        Self {
            format: BomFormat::parse_or_default(params.get("format").map(String::as_str)),
            cascade: flag("cascade"),
            max_levels: params.get("levels").and_then(|v| parse_levels(v)),
            parameter_data: flag("parameter_data"),
            stock_data: flag("stock_data"),
            supplier_data: flag("supplier_data"),
            manufacturer_data: flag("manufacturer_data"),
            pricing_data: flag("pricing_data"),
            substitute_part_data: flag("substitute_part_data"),
        }
    }
}

fn parse_levels(value: &str) -> Option<u32> {
    match value.trim().parse::<i64>() {
        Ok(n) if n > 0 => u32::try_from(n).ok(),
        _ => None,
    }
}

/// One flattened BOM line with everything the optional columns need.
struct Row {
    level: u32,
    item: BomItem,
    sub_part: Part,
}

/// Walks a part's BOM and renders it with the requested column groups.
pub struct BomExporter<'a> {
    catalog: &'a dyn PartCatalog,
    history: &'a dyn PurchaseHistory,
    stock: &'a dyn StockLevels,
}

impl<'a> BomExporter<'a> {
    pub fn new(
        catalog: &'a dyn PartCatalog,
        history: &'a dyn PurchaseHistory,
        stock: &'a dyn StockLevels,
    ) -> Self {
        Self {
            catalog,
            history,
            stock,
        }
    }

    pub fn export(&self, part_id: PartId, options: &BomExportOptions) -> Result<BomExport, ExportError> {
        let part = self
            .catalog
            .part(part_id)?
            .ok_or(ExportError::UnknownPart(part_id))?;

        let mut rows = Vec::new();
        let mut path = HashSet::from([part_id]);
        self.collect(part_id, 1, options, &mut path, &mut rows)?;

        let table = self.render(&rows, options)?;
        tracing::debug!(
            part = %part_id,
            lines = rows.len(),
            format = %options.format,
            "exported BOM"
        );

        Ok(BomExport {
            filename: format!("{}_BOM.{}", part.full_name(), options.format.extension()),
            content_type: options.format.content_type(),
            bytes: table.encode(options.format)?,
        })
    }

    fn collect(
        &self,
        part: PartId,
        level: u32,
        options: &BomExportOptions,
        path: &mut HashSet<PartId>,
        rows: &mut Vec<Row>,
    ) -> Result<(), ExportError> {
        for item in self.catalog.bom_items(part)? {
            let Some(sub_part) = self.catalog.part(item.sub_part)? else {
                tracing::warn!(part = %part, sub_part = %item.sub_part, "BOM line references a missing part");
                continue;
            };
            let descend = options.cascade
                && sub_part.assembly
                && options.max_levels.is_none_or(|max| level < max);
            let sub_id = sub_part.id;
            rows.push(Row {
                level,
                item,
                sub_part,
            });

            if descend {
                if !path.insert(sub_id) {
                    tracing::warn!(part = %part, sub_part = %sub_id, "BOM recursion detected, not descending");
                    continue;
                }
                self.collect(sub_id, level + 1, options, path, rows)?;
                path.remove(&sub_id);
            }
        }
        Ok(())
    }

    fn render(&self, rows: &[Row], options: &BomExportOptions) -> Result<Table, ExportError> {
        let parameter_names: BTreeSet<String> = if options.parameter_data {
            rows.iter()
                .flat_map(|r| r.sub_part.parameters.keys().cloned())
                .collect()
        } else {
            BTreeSet::new()
        };

        let mut supplier_parts = Vec::with_capacity(rows.len());
        if options.supplier_data || options.manufacturer_data {
            for row in rows {
                supplier_parts.push(self.catalog.supplier_parts(row.sub_part.id)?);
            }
        }
        let supplier_slots = supplier_parts.iter().map(Vec::len).max().unwrap_or(0);
        let substitute_slots = if options.substitute_part_data {
            rows.iter().map(|r| r.item.substitutes.len()).max().unwrap_or(0)
        } else {
            0
        };

        let mut headers: Vec<String> = [
            "Level",
            "BOM_Item_ID",
            "Parent_ID",
            "Part_ID",
            "Part_IPN",
            "Part_Name",
            "Description",
            "Quantity",
            "Optional",
            "Reference",
            "Note",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        headers.extend(parameter_names.iter().cloned());
        if options.stock_data {
            headers.push("In_Stock".into());
        }
        for n in 1..=supplier_slots {
            if options.supplier_data {
                headers.push(format!("Supplier_{n}"));
                headers.push(format!("SKU_{n}"));
            }
            if options.manufacturer_data {
                headers.push(format!("Manufacturer_{n}"));
                headers.push(format!("MPN_{n}"));
            }
        }
        if options.pricing_data {
            headers.push("Min_Price".into());
            headers.push("Max_Price".into());
        }
        for n in 1..=substitute_slots {
            headers.push(format!("Substitute_{n}"));
        }

        let pricer = BomPricer::new(self.catalog, self.history);
        let mut table = Table::new(headers);

        for (index, row) in rows.iter().enumerate() {
            let mut cells = vec![
                row.level.to_string(),
                row.item.id.to_string(),
                row.item.part.to_string(),
                row.sub_part.id.to_string(),
                row.sub_part.ipn.clone().unwrap_or_default(),
                row.sub_part.name.clone(),
                row.sub_part.description.clone(),
                decimal_cell(row.item.quantity),
                row.item.optional.to_string(),
                row.item.reference.clone(),
                row.item.note.clone(),
            ];

            for name in &parameter_names {
                cells.push(row.sub_part.parameters.get(name).cloned().unwrap_or_default());
            }

            if options.stock_data {
                cells.push(decimal_cell(self.stock.in_stock(row.sub_part.id)?));
            }

            let suppliers: &[SupplierPart] = supplier_parts.get(index).map(Vec::as_slice).unwrap_or(&[]);
            for slot in 0..supplier_slots {
                let sp = suppliers.get(slot);
                if options.supplier_data {
                    cells.push(sp.map(|s| s.supplier.clone()).unwrap_or_default());
                    cells.push(sp.map(|s| s.sku.clone()).unwrap_or_default());
                }
                if options.manufacturer_data {
                    cells.push(sp.and_then(|s| s.manufacturer.clone()).unwrap_or_default());
                    cells.push(sp.and_then(|s| s.mpn.clone()).unwrap_or_default());
                }
            }

            if options.pricing_data {
                let range = pricer.part_price_range(row.sub_part.id, row.item.quantity, BomPricingMode::market())?;
                cells.push(range.map(|r| decimal_cell(round_price(r.min))).unwrap_or_default());
                cells.push(range.map(|r| decimal_cell(round_price(r.max))).unwrap_or_default());
            }

            for slot in 0..substitute_slots {
                let name = match row.item.substitutes.get(slot) {
                    Some(id) => self
                        .catalog
                        .part(*id)?
                        .map(|p| p.full_name())
                        .unwrap_or_else(|| id.to_string()),
                    None => String::new(),
                };
                cells.push(name);
            }

            table.push_row(cells);
        }

        Ok(table)
    }
}

fn decimal_cell(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Export the BOM of `part` using the given sources.
pub fn export_bom(
    catalog: &dyn PartCatalog,
    history: &dyn PurchaseHistory,
    stock: &dyn StockLevels,
    part: PartId,
    options: &BomExportOptions,
) -> Result<BomExport, ExportError> {
    BomExporter::new(catalog, history, stock).export(part, options)
}
