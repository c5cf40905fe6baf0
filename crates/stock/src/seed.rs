//! JSON fixtures for populating a stock ledger.

use serde::{Deserialize, Serialize};

use crate::{PurchaseOrder, StockError, StockItem, StockLedger};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockSeed {
    #[serde(default)]
    pub purchase_orders: Vec<PurchaseOrder>,
    #[serde(default)]
    pub stock_items: Vec<StockItem>,
}

impl StockSeed {
    /// Orders go in first so stock items can reference them.
    pub fn apply(self, ledger: &StockLedger) -> Result<usize, StockError> {
        let mut count = 0;
        for order in self.purchase_orders {
            ledger.add_order(order)?;
            count += 1;
        }
        for item in self.stock_items {
            ledger.insert_item(item)?;
            count += 1;
        }
        Ok(count)
    }
}
