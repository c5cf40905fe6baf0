use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use inventree_core::{BomItemId, DomainError, DomainResult, Entity, PartId};

/// One line of a bill of materials: `quantity` of `sub_part` per `part`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomItem {
    #[serde(default)]
    pub id: BomItemId,
    pub part: PartId,
    pub sub_part: PartId,
    pub quantity: Decimal,
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub optional: bool,
    /// Parts that may be used in place of `sub_part`.
    #[serde(default)]
    pub substitutes: Vec<PartId>,
}

impl BomItem {
    pub fn new(part: PartId, sub_part: PartId, quantity: Decimal) -> DomainResult<Self> {
        let item = Self {
            id: BomItemId::new(),
            part,
            sub_part,
            quantity,
            reference: String::new(),
            note: String::new(),
            optional: false,
            substitutes: Vec::new(),
        };
        item.validate()?;
        Ok(item)
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_substitute(mut self, part: PartId) -> Self {
        self.substitutes.push(part);
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.quantity <= Decimal::ZERO {
            return Err(DomainError::validation("BOM quantity must be positive"));
        }
        if self.part == self.sub_part {
            return Err(DomainError::invariant("part cannot be added to its own BOM"));
        }
        Ok(())
    }
}

impl Entity for BomItem {
    type Id = BomItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
