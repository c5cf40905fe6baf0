use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use inventree_core::{Currency, parse_quantity};
use inventree_pricing::PricingContext;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct PricingQuery {
    pub quantity: Option<String>,
    pub currency: Option<String>,
}

/// Form body of a pricing POST. `quantity` may be a JSON number or string.
#[derive(Debug, Default, Deserialize)]
pub struct PricingRequest {
    pub quantity: Option<serde_json::Value>,
    pub currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TemplateQuery {
    pub format: Option<String>,
}

impl PricingQuery {
    pub fn quantity(&self) -> Decimal {
        self.quantity.as_deref().map(parse_quantity).unwrap_or(Decimal::ONE)
    }

    pub fn currency(&self) -> Option<Currency> {
        parse_currency(self.currency.as_deref())
    }
}

impl PricingRequest {
    pub fn quantity(&self) -> Decimal {
        match &self.quantity {
            Some(serde_json::Value::String(s)) => parse_quantity(s),
            Some(serde_json::Value::Number(n)) => parse_quantity(&n.to_string()),
            _ => Decimal::ONE,
        }
    }

    pub fn currency(&self) -> Option<Currency> {
        parse_currency(self.currency.as_deref())
    }
}

fn parse_currency(raw: Option<&str>) -> Option<Currency> {
    raw.map(str::trim).filter(|c| !c.is_empty()).map(Currency::new)
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct PricingResponse {
    #[serde(flatten)]
    pub context: PricingContext,
    /// Present on form submissions; always false so the client keeps the
    /// pricing form open.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_valid: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct MigrationResponse {
    pub updated: usize,
}
