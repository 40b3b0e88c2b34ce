use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique product identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

/// Category of raw material sold to street-food vendors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductCategory {
    Vegetables,
    Spices,
    Oil,
    Flour,
    Dairy,
    Other(String),
}

/// Unit of measure for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Kg,
    Litre,
    Piece,
    Gram,
}

/// One rung of a product's bulk pricing ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkTier {
    pub min_quantity: f64,
    pub price_per_unit: f64,
    pub discount_percentage: f64,
}

/// A wholesale product with tiered bulk pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: ProductCategory,
    pub unit: Unit,
    /// Price per unit in rupees when no bulk tier applies.
    pub base_price: f64,
    pub current_stock: f64,
    pub supplier_id: String,
    /// Tiers sorted by the producer in ascending `min_quantity`; the resolver
    /// does not rely on that ordering.
    pub bulk_pricing: Vec<BulkTier>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Resolve the unit price for a requested quantity.
    ///
    /// Among tiers with `min_quantity <= quantity`, the one with the greatest
    /// `min_quantity` wins. If no tier qualifies (including quantity 0), the
    /// base price applies.
    pub fn resolve_unit_price(&self, quantity: f64) -> f64 {
        self.bulk_pricing
            .iter()
            .filter(|t| t.min_quantity <= quantity)
            .max_by(|a, b| a.min_quantity.total_cmp(&b.min_quantity))
            .map(|t| t.price_per_unit)
            .unwrap_or(self.base_price)
    }

    /// Per-unit savings over the base price at a given quantity.
    pub fn savings_per_unit(&self, quantity: f64) -> f64 {
        self.base_price - self.resolve_unit_price(quantity)
    }

    /// Check that price does not increase as `min_quantity` grows.
    ///
    /// Violations are not an error: the resolver still returns whatever the
    /// ladder says. Callers that care should log the violation.
    pub fn tiers_are_monotonic(&self) -> bool {
        let mut tiers: Vec<&BulkTier> = self.bulk_pricing.iter().collect();
        tiers.sort_by(|a, b| a.min_quantity.total_cmp(&b.min_quantity));
        let mut last_price = self.base_price;
        for tier in tiers {
            if tier.price_per_unit > last_price {
                return false;
            }
            last_price = tier.price_per_unit;
        }
        true
    }
}
