use std::collections::BTreeMap;

use tracing::warn;

use saath_common::order::Order;
use saath_common::product::{Product, ProductId};

/// Sum quantities per product across a set of orders.
pub fn aggregate_quantities(orders: &[&Order]) -> BTreeMap<ProductId, f64> {
    let mut totals: BTreeMap<ProductId, f64> = BTreeMap::new();
    for order in orders {
        for item in &order.items {
            *totals.entry(item.product_id.clone()).or_insert(0.0) += item.quantity;
        }
    }
    totals
}

/// Projected rupee savings if the given orders were bought together.
///
/// For each product, the aggregate quantity is priced against the bulk ladder
/// and the per-unit saving is multiplied back out. Products missing from the
/// catalog contribute nothing. Full precision; round only for display via
/// [`round_rupees`].
pub fn project_savings(orders: &[&Order], products: &[Product]) -> f64 {
    let mut total = 0.0;
    for (product_id, quantity) in aggregate_quantities(orders) {
        let Some(product) = products.iter().find(|p| p.id == product_id) else {
            warn!(product = %product_id.0, "order references product missing from catalog");
            continue;
        };
        if !product.tiers_are_monotonic() {
            warn!(product = %product_id.0, "non-monotonic bulk ladder, pricing as-is");
        }
        total += product.savings_per_unit(quantity) * quantity;
    }
    total
}

/// Round to whole rupees at the presentation boundary.
pub fn round_rupees(amount: f64) -> i64 {
    amount.round() as i64
}
