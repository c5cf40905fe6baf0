use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use inventree_core::{Entity, PartId, PurchaseOrderId, PurchaseOrderLineId, StockItemId, SupplierPartId};

/// A quantity of a part held in stock.
///
/// `purchase_price` is per base unit of the part, not per supplier pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockItem {
    #[serde(default)]
    pub id: StockItemId,
    pub part: PartId,
    #[serde(default)]
    pub supplier_part: Option<SupplierPartId>,
    #[serde(default)]
    pub purchase_order: Option<PurchaseOrderId>,
    /// The order line this item was received against. Records from older
    /// releases only carry the order.
    #[serde(default)]
    pub purchase_order_line: Option<PurchaseOrderLineId>,
    pub quantity: Decimal,
    #[serde(default)]
    pub purchase_price: Option<Decimal>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl StockItem {
    pub fn new(part: PartId, quantity: Decimal) -> Self {
        Self {
            id: StockItemId::new(),
            part,
            supplier_part: None,
            purchase_order: None,
            purchase_order_line: None,
            quantity,
            purchase_price: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_purchase_price(mut self, price: Decimal) -> Self {
        self.purchase_price = Some(price);
        self
    }

    pub fn from_purchase(mut self, order: PurchaseOrderId, supplier_part: SupplierPartId) -> Self {
        self.purchase_order = Some(order);
        self.supplier_part = Some(supplier_part);
        self
    }

    pub fn from_line(mut self, line: PurchaseOrderLineId) -> Self {
        self.purchase_order_line = Some(line);
        self
    }
}

impl Entity for StockItem {
    type Id = StockItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
