use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use saath_common::location::GeoLocation;
use saath_common::order::{Order, OrderStatus};
use saath_common::vendor::Vendor;

/// Default recency window for compatible orders.
pub fn default_compatibility_window() -> Duration {
    Duration::hours(2)
}

/// Vendors within `radius_km` of `center` (inclusive boundary).
///
/// Vendors without a stall location cannot be matched and are skipped.
pub fn find_nearby_vendors(vendors: &[Vendor], center: &GeoLocation, radius_km: f64) -> Vec<Vendor> {
    vendors
        .iter()
        .filter(|v| match &v.stall_location {
            Some(location) => center.within_km(location, radius_km),
            None => {
                debug!(vendor = %v.id.0, "skipping vendor without stall location");
                false
            }
        })
        .cloned()
        .collect()
}

/// Pending orders within the recency window that share at least one product
/// with `reference`.
///
/// The reference order itself never matches, so callers can pass a candidate
/// set that still contains it. Result order is stable with respect to input.
pub fn find_compatible_orders(
    candidates: &[Order],
    reference: &Order,
    now: DateTime<Utc>,
    window: Duration,
) -> Vec<Order> {
    let cutoff = now - window;
    candidates
        .iter()
        .filter(|o| o.id != reference.id)
        .filter(|o| o.status == OrderStatus::Pending)
        .filter(|o| o.created_at >= cutoff)
        .filter(|o| o.shares_product_with(reference))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use saath_common::order::{OrderId, OrderItem, PaymentMethod};
    use saath_common::product::ProductId;
    use saath_common::vendor::{VendorId, VerificationStatus};

    fn vendor(id: &str, location: Option<(f64, f64)>) -> Vendor {
        Vendor {
            id: VendorId(id.into()),
            name: id.into(),
            phone: None,
            stall_address: None,
            stall_location: location.map(|(lat, lon)| GeoLocation::new(lat, lon)),
            verification_status: VerificationStatus::Verified,
            credit_limit: 0.0,
            total_savings: 0.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn order(id: &str, product: &str, age: Duration, status: OrderStatus) -> Order {
        Order {
            id: OrderId(id.into()),
            vendor_id: VendorId(format!("vendor-of-{id}")),
            items: vec![OrderItem {
                product_id: ProductId(product.into()),
                product_name: product.into(),
                quantity: 10.0,
                unit_price: 30.0,
                total_price: 300.0,
            }],
            total_amount: 300.0,
            payment_method: PaymentMethod::Cash,
            status,
            group_id: None,
            delivery_address: "CP".into(),
            delivery_location: None,
            created_at: Utc::now() - age,
            delivery_time: None,
        }
    }

    #[test]
    fn nearby_excludes_vendors_without_location() {
        let center = GeoLocation::new(28.6139, 77.2090);
        let vendors = vec![
            vendor("with", Some((28.6142, 77.2093))), // ~40 m away
            vendor("without", None),
        ];
        let nearby = find_nearby_vendors(&vendors, &center, 2.0);
        assert_eq!(nearby.len(), 1);
        assert_eq!(nearby[0].id, VendorId("with".into()));
    }

    #[test]
    fn nearby_is_monotonic_in_radius() {
        let center = GeoLocation::new(28.6139, 77.2090);
        let vendors = vec![
            vendor("close", Some((28.6142, 77.2093))),
            vendor("mid", Some((28.6239, 77.2190))),   // ~1.5 km
            vendor("far", Some((28.7041, 77.1025))),   // ~14 km (Azadpur)
        ];
        let small = find_nearby_vendors(&vendors, &center, 0.5);
        let large = find_nearby_vendors(&vendors, &center, 2.0);
        for v in &small {
            assert!(large.iter().any(|lv| lv.id == v.id));
        }
        assert!(small.len() <= large.len());
        assert!(!large.iter().any(|v| v.id == VendorId("far".into())));
    }

    #[test]
    fn compatible_requires_shared_product_and_recency() {
        let reference = order("ref", "onions", Duration::zero(), OrderStatus::Pending);
        let now = Utc::now();
        let candidates = vec![
            order("fresh-match", "onions", Duration::minutes(30), OrderStatus::Pending),
            order("stale-match", "onions", Duration::hours(3), OrderStatus::Pending),
            order("different", "tomatoes", Duration::minutes(30), OrderStatus::Pending),
            order("claimed", "onions", Duration::minutes(30), OrderStatus::Grouped),
        ];

        let matched =
            find_compatible_orders(&candidates, &reference, now, default_compatibility_window());
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, OrderId("fresh-match".into()));
    }

    #[test]
    fn reference_order_never_matches_itself() {
        let reference = order("ref", "onions", Duration::zero(), OrderStatus::Pending);
        let candidates = vec![reference.clone()];
        let matched = find_compatible_orders(
            &candidates,
            &reference,
            Utc::now(),
            default_compatibility_window(),
        );
        assert!(matched.is_empty());
    }
}
