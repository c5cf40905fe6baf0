//! Bill of materials export and upload template generation.

pub mod export;
pub mod format;
pub mod table;
pub mod template;

pub use export::{BomExport, BomExporter, BomExportOptions, ExportError, export_bom};
pub use format::BomFormat;
pub use table::{Table, TableError};
pub use template::{TEMPLATE_COLUMNS, bom_template};
