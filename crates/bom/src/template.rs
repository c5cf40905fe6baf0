use crate::export::BomExport;
use crate::format::BomFormat;
use crate::table::{Table, TableError};

/// Columns accepted by the BOM upload importer.
pub const TEMPLATE_COLUMNS: [&str; 10] = [
    "Part_ID",
    "Part_IPN",
    "Part_Name",
    "Quantity",
    "Optional",
    "Overage",
    "Reference",
    "Note",
    "Inherited",
    "Allow_Variants",
];

/// Header-only upload template.
///
/// Delimited formats carry just the header line; the JSON template is a single
/// object with every column present and empty.
pub fn bom_template(format: BomFormat) -> Result<BomExport, TableError> {
    let mut table = Table::new(TEMPLATE_COLUMNS);
    if format == BomFormat::Json {
        table.push_row(Vec::new());
    }

    Ok(BomExport {
        filename: format!("InvenTree_BOM_Template.{}", format.extension()),
        content_type: format.content_type(),
        bytes: table.encode(format)?,
    })
}
