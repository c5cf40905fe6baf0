use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use inventree_core::{DomainError, DomainResult, Entity, PartId, SupplierPartId};

use crate::price_break::PriceBreaks;

fn one() -> Decimal {
    Decimal::ONE
}

/// A part as sold by one supplier.
///
/// `pack_size` is the number of base units in one purchasable unit. Prices on
/// purchase order lines are per pack; anything stored per base unit must be
/// divided through by `pack_size`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierPart {
    #[serde(default)]
    pub id: SupplierPartId,
    pub part: PartId,
    pub supplier: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub mpn: Option<String>,
    #[serde(default = "one")]
    pub pack_size: Decimal,
    /// Minimum order quantity.
    #[serde(default = "one")]
    pub moq: Decimal,
    /// Order quantities are rounded up to a multiple of this.
    #[serde(default = "one")]
    pub multiple: Decimal,
    #[serde(default)]
    pub base_cost: Decimal,
    #[serde(default)]
    pub price_breaks: PriceBreaks,
}

impl SupplierPart {
    pub fn new(part: PartId, supplier: impl Into<String>, sku: impl Into<String>) -> Self {
        Self {
            id: SupplierPartId::new(),
            part,
            supplier: supplier.into(),
            sku: sku.into(),
            manufacturer: None,
            mpn: None,
            pack_size: Decimal::ONE,
            moq: Decimal::ONE,
            multiple: Decimal::ONE,
            base_cost: Decimal::ZERO,
            price_breaks: PriceBreaks::default(),
        }
    }

    pub fn with_id(mut self, id: SupplierPartId) -> Self {
        self.id = id;
        self
    }

    pub fn with_pack_size(mut self, pack_size: Decimal) -> Self {
        self.pack_size = pack_size;
        self
    }

    pub fn with_moq(mut self, moq: Decimal) -> Self {
        self.moq = moq;
        self
    }

    pub fn with_multiple(mut self, multiple: Decimal) -> Self {
        self.multiple = multiple;
        self
    }

    pub fn with_base_cost(mut self, base_cost: Decimal) -> Self {
        self.base_cost = base_cost;
        self
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>, mpn: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self.mpn = Some(mpn.into());
        self
    }

    pub fn with_price_breaks(mut self, breaks: PriceBreaks) -> Self {
        self.price_breaks = breaks;
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.pack_size <= Decimal::ZERO {
            return Err(DomainError::validation("pack size must be positive"));
        }
        if self.moq < Decimal::ONE {
            return Err(DomainError::validation("minimum order quantity must be at least 1"));
        }
        if self.multiple < Decimal::ONE {
            return Err(DomainError::validation("order multiple must be at least 1"));
        }
        if self.base_cost < Decimal::ZERO {
            return Err(DomainError::validation("base cost cannot be negative"));
        }
        Ok(())
    }

    /// Quantity actually ordered for a request of `quantity` units.
    ///
    /// `None` if rounding up to the order multiple overflows.
    pub fn order_quantity(&self, quantity: Decimal) -> Option<Decimal> {
        let quantity = quantity.max(self.moq);
        if self.multiple <= Decimal::ONE {
            return Some(quantity);
        }
        quantity
            .checked_div(self.multiple)?
            .ceil()
            .checked_mul(self.multiple)
    }

    /// Total purchase price for `quantity` units (MOQ and multiples applied).
    pub fn price_at(&self, quantity: Decimal) -> Option<Decimal> {
        let quantity = self.order_quantity(quantity)?;
        self.price_breaks.total_at(quantity, self.base_cost)
    }

    /// Convert a per-pack price into a per-base-unit price.
    ///
    /// `None` if the division overflows (a vanishingly small pack size).
    pub fn unit_price(&self, pack_price: Decimal) -> Option<Decimal> {
        if self.pack_size <= Decimal::ZERO {
            return Some(pack_price);
        }
        pack_price.checked_div(self.pack_size)
    }
}

impl Entity for SupplierPart {
    type Id = SupplierPartId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
