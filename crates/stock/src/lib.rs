//! Stock module: purchase orders, received stock and its purchase prices.
//!
//! Received stock is the source of historical purchase prices used by the
//! purchase-only BOM pricing pass. `migrations` holds the data fixes that
//! repair stock records written by older releases.

pub mod item;
pub mod ledger;
pub mod migrations;
pub mod order;
pub mod seed;

pub use item::StockItem;
pub use ledger::{StockError, StockLedger};
pub use migrations::{DataMigration, FixPurchasePrice, MigrationReport, MigrationRunner, fix_purchase_price};
pub use order::{PurchaseOrder, PurchaseOrderLine, PurchaseOrderStatus};
pub use seed::StockSeed;
