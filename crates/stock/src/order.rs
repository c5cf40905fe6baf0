use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use inventree_core::{DomainError, DomainResult, Entity, PurchaseOrderId, PurchaseOrderLineId, SupplierPartId};

/// Purchase order status lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseOrderStatus {
    #[default]
    Pending,
    Placed,
    Complete,
    Cancelled,
}

/// Purchase order line item.
///
/// `quantity` is counted in supplier packs and `purchase_price` is the price
/// of one pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrderLine {
    #[serde(default)]
    pub id: PurchaseOrderLineId,
    pub part: SupplierPartId,
    pub quantity: Decimal,
    #[serde(default)]
    pub received: Decimal,
    #[serde(default)]
    pub purchase_price: Option<Decimal>,
}

impl PurchaseOrderLine {
    pub fn new(part: SupplierPartId, quantity: Decimal, purchase_price: Option<Decimal>) -> DomainResult<Self> {
        if quantity <= Decimal::ZERO {
            return Err(DomainError::validation("line quantity must be positive"));
        }
        if purchase_price.is_some_and(|p| p < Decimal::ZERO) {
            return Err(DomainError::validation("purchase price cannot be negative"));
        }
        Ok(Self {
            id: PurchaseOrderLineId::new(),
            part,
            quantity,
            received: Decimal::ZERO,
            purchase_price,
        })
    }

    pub fn remaining(&self) -> Decimal {
        (self.quantity - self.received).max(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    #[serde(default)]
    pub id: PurchaseOrderId,
    pub reference: String,
    pub supplier: String,
    #[serde(default)]
    pub status: PurchaseOrderStatus,
    #[serde(default)]
    pub lines: Vec<PurchaseOrderLine>,
}

impl PurchaseOrder {
    pub fn new(reference: impl Into<String>, supplier: impl Into<String>) -> Self {
        Self {
            id: PurchaseOrderId::new(),
            reference: reference.into(),
            supplier: supplier.into(),
            status: PurchaseOrderStatus::Pending,
            lines: Vec::new(),
        }
    }

    pub fn with_line(mut self, line: PurchaseOrderLine) -> Self {
        self.lines.push(line);
        self
    }

    pub fn line(&self, id: PurchaseOrderLineId) -> Option<&PurchaseOrderLine> {
        self.lines.iter().find(|l| l.id == id)
    }

    pub fn is_fully_received(&self) -> bool {
        self.lines.iter().all(|l| l.remaining().is_zero())
    }
}

impl Entity for PurchaseOrder {
    type Id = PurchaseOrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
