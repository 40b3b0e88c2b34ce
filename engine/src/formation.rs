use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use saath_common::group::{BuyingGroup, GroupId, GroupProduct, GroupStatus, MemberContribution};
use saath_common::location::GeoLocation;
use saath_common::order::{Order, OrderId};
use saath_common::product::{Product, ProductId};
use saath_common::vendor::{Vendor, VendorId};

use crate::matching::{find_compatible_orders, find_nearby_vendors};
use crate::savings::project_savings;
use crate::store::MarketStore;

/// Thresholds and windows governing group formation.
#[derive(Debug, Clone)]
pub struct FormationConfig {
    /// Radius around the triggering vendor's stall.
    pub radius_km: f64,
    /// How far back pending orders are considered compatible.
    pub compatibility_window: Duration,
    /// Minimum distinct vendors for a group (triggering vendor included).
    pub minimum_members: usize,
    /// Minimum projected savings in rupees.
    pub minimum_savings: f64,
    /// How long members have to confirm after formation.
    pub formation_window: Duration,
    /// Lead time from formation to the delivery slot.
    pub delivery_lead: Duration,
}

impl Default for FormationConfig {
    fn default() -> Self {
        Self {
            radius_km: 2.0,
            compatibility_window: Duration::hours(2),
            minimum_members: 2,
            minimum_savings: 50.0,
            formation_window: Duration::minutes(30),
            delivery_lead: Duration::hours(4),
        }
    }
}

/// Why an order fell through to individual processing.
#[derive(Debug, Clone, PartialEq)]
pub enum IndividualReason {
    /// The triggering vendor has not pinned a stall location.
    NoStallLocation,
    /// No compatible pending orders nearby.
    NoCompatibleOrders,
    /// Compatible orders exist but the projected savings are too small.
    BelowSavingsThreshold { projected: f64 },
    /// A concurrent formation claimed one of the orders first.
    OrdersAlreadyClaimed,
    /// The group record could not be written; claims were rolled back.
    StoreUnavailable,
}

/// Outcome of one formation pipeline run.
#[derive(Debug, Clone)]
pub enum FormationOutcome {
    Formed(BuyingGroup),
    Individual(IndividualReason),
}

impl FormationOutcome {
    pub fn is_formed(&self) -> bool {
        matches!(self, FormationOutcome::Formed(_))
    }
}

/// Runs the order-triggered formation pipeline against a store.
///
/// One synchronous pass per new order: nearby vendors, compatible orders,
/// savings projection, threshold check, then an optimistic claim and a single
/// group write. Lookup failures degrade to empty sets so a flaky store can
/// never crash order placement, only downgrade it to individual processing.
pub struct GroupFormationEngine<S: MarketStore> {
    store: S,
    config: FormationConfig,
}

impl<S: MarketStore> GroupFormationEngine<S> {
    pub fn new(store: S, config: FormationConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &FormationConfig {
        &self.config
    }

    /// Try to form a buying group around `order`, placed by `vendor`, at `now`.
    pub fn process_order(&self, vendor: &Vendor, order: &Order, now: DateTime<Utc>) -> FormationOutcome {
        let Some(center) = vendor.stall_location.clone() else {
            debug!(vendor = %vendor.id.0, "no stall location, processing individually");
            return FormationOutcome::Individual(IndividualReason::NoStallLocation);
        };

        let vendors = self.store.list_vendors().unwrap_or_else(|e| {
            warn!(error = %e, "vendor lookup failed, degrading to empty set");
            Vec::new()
        });
        let nearby = find_nearby_vendors(&vendors, &center, self.config.radius_km);

        let pending = self.store.list_pending_orders().unwrap_or_else(|e| {
            warn!(error = %e, "order lookup failed, degrading to empty set");
            Vec::new()
        });
        // Only orders placed by vendors inside the radius can join; the
        // triggering vendor's own other orders are excluded as well.
        let candidates: Vec<Order> = pending
            .into_iter()
            .filter(|o| o.vendor_id != vendor.id)
            .filter(|o| nearby.iter().any(|v| v.id == o.vendor_id))
            .collect();
        let compatible =
            find_compatible_orders(&candidates, order, now, self.config.compatibility_window);

        if compatible.is_empty() {
            return FormationOutcome::Individual(IndividualReason::NoCompatibleOrders);
        }

        let products = self.store.list_products().unwrap_or_else(|e| {
            warn!(error = %e, "product lookup failed, degrading to empty set");
            Vec::new()
        });

        let mut all_orders: Vec<&Order> = Vec::with_capacity(compatible.len() + 1);
        all_orders.push(order);
        all_orders.extend(compatible.iter());

        let projected = project_savings(&all_orders, &products);
        let distinct_members = distinct_vendor_count(&all_orders);

        let qualifies = compatible.len() >= self.config.minimum_members.saturating_sub(1)
            && distinct_members >= self.config.minimum_members
            && projected >= self.config.minimum_savings;
        if !qualifies {
            debug!(
                projected,
                members = distinct_members,
                "formation criteria not met"
            );
            return FormationOutcome::Individual(IndividualReason::BelowSavingsThreshold {
                projected,
            });
        }

        let group = build_group(&all_orders, &products, center, now, &self.config);
        self.commit(group, &all_orders)
    }

    /// Claim the member orders, then write the group. The claim is the
    /// optimistic lock: if any order was taken by a concurrent formation,
    /// nothing is written. If the group write itself fails the claims are
    /// rolled back, so no order stays `Grouped` without a group record.
    fn commit(&self, group: BuyingGroup, orders: &[&Order]) -> FormationOutcome {
        let order_ids: Vec<OrderId> = orders.iter().map(|o| o.id.clone()).collect();

        if let Err(e) = self.store.claim_orders(&order_ids, &group.id) {
            warn!(error = %e, "order claim lost, processing individually");
            return FormationOutcome::Individual(IndividualReason::OrdersAlreadyClaimed);
        }

        match self.store.create_group(group.clone()) {
            Ok(id) => {
                info!(group = %id.0, orders = order_ids.len(), "buying group formed");
                FormationOutcome::Formed(group)
            }
            Err(e) => {
                warn!(error = %e, "group write failed, releasing claimed orders");
                if let Err(release_err) = self.store.release_orders(&order_ids) {
                    warn!(error = %release_err, "claim rollback also failed");
                }
                FormationOutcome::Individual(IndividualReason::StoreUnavailable)
            }
        }
    }
}

/// Random-suffix group id in the style of a document store's generated ids.
fn fresh_group_id(now: DateTime<Utc>) -> GroupId {
    use rand::distributions::Alphanumeric;
    use rand::Rng;

    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    GroupId(format!("grp-{}-{}", now.timestamp_millis(), suffix))
}

fn distinct_vendor_count(orders: &[&Order]) -> usize {
    let mut ids: Vec<&VendorId> = orders.iter().map(|o| &o.vendor_id).collect();
    ids.sort();
    ids.dedup();
    ids.len()
}

/// Build the immutable group record from the member orders.
fn build_group(
    orders: &[&Order],
    products: &[Product],
    center: GeoLocation,
    now: DateTime<Utc>,
    config: &FormationConfig,
) -> BuyingGroup {
    // Unique member ids, first-seen order preserved (triggering vendor first).
    let mut member_ids: Vec<VendorId> = Vec::new();
    for order in orders {
        if !member_ids.contains(&order.vendor_id) {
            member_ids.push(order.vendor_id.clone());
        }
    }

    let mut totals: BTreeMap<&ProductId, f64> = BTreeMap::new();
    let mut contributions: BTreeMap<&ProductId, Vec<MemberContribution>> = BTreeMap::new();
    for order in orders {
        for item in &order.items {
            *totals.entry(&item.product_id).or_insert(0.0) += item.quantity;
            contributions
                .entry(&item.product_id)
                .or_default()
                .push(MemberContribution {
                    vendor_id: order.vendor_id.clone(),
                    quantity: item.quantity,
                    individual_savings: 0.0,
                });
        }
    }

    let mut group_products = Vec::new();
    for (product_id, total_quantity) in &totals {
        let Some(product) = products.iter().find(|p| p.id == **product_id) else {
            // Unknown products are priced by nobody; leave them out of the
            // group record just as they are left out of the projection.
            continue;
        };
        let bulk_price = product.resolve_unit_price(*total_quantity);
        let savings_per_unit = product.base_price - bulk_price;

        let mut member_orders = contributions.remove(product_id).unwrap_or_default();
        for member in &mut member_orders {
            member.individual_savings = savings_per_unit * member.quantity;
        }

        group_products.push(GroupProduct {
            product_id: (*product_id).clone(),
            product_name: product.name.clone(),
            total_quantity: *total_quantity,
            unit_price: product.base_price,
            bulk_price,
            total_savings: savings_per_unit * total_quantity,
            member_orders,
        });
    }

    let total_value = group_products
        .iter()
        .map(|p| p.bulk_price * p.total_quantity)
        .sum();
    let total_savings = group_products.iter().map(|p| p.total_savings).sum();

    BuyingGroup {
        id: fresh_group_id(now),
        member_ids,
        products: group_products,
        total_value,
        total_savings,
        status: GroupStatus::Forming,
        center_location: center,
        radius_km: config.radius_km,
        formation_deadline: now + config.formation_window,
        minimum_members: config.minimum_members,
        delivery_slot: now + config.delivery_lead,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saath_common::order::{OrderItem, OrderStatus, PaymentMethod};
    use saath_common::product::{BulkTier, ProductCategory, Unit};

    fn order(id: &str, vendor_id: &str, items: &[(&str, f64)]) -> Order {
        Order {
            id: OrderId(id.into()),
            vendor_id: VendorId(vendor_id.into()),
            items: items
                .iter()
                .map(|(pid, qty)| OrderItem {
                    product_id: ProductId((*pid).into()),
                    product_name: (*pid).into(),
                    quantity: *qty,
                    unit_price: 30.0,
                    total_price: 30.0 * qty,
                })
                .collect(),
            total_amount: 0.0,
            payment_method: PaymentMethod::Cash,
            status: OrderStatus::Pending,
            group_id: None,
            delivery_address: "CP".into(),
            delivery_location: None,
            created_at: Utc::now(),
            delivery_time: None,
        }
    }

    fn onions() -> Product {
        Product {
            id: ProductId("onions".into()),
            name: "Onions".into(),
            category: ProductCategory::Vegetables,
            unit: Unit::Kg,
            base_price: 30.0,
            current_stock: 1000.0,
            supplier_id: "supplier-1".into(),
            bulk_pricing: vec![
                BulkTier { min_quantity: 10.0, price_per_unit: 28.0, discount_percentage: 6.7 },
                BulkTier { min_quantity: 25.0, price_per_unit: 25.0, discount_percentage: 16.7 },
            ],
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn built_group_attributes_savings_per_member() {
        let a = order("a", "raju", &[("onions", 20.0)]);
        let b = order("b", "meena", &[("onions", 10.0)]);
        let now = Utc::now();
        let config = FormationConfig::default();
        let group = build_group(
            &[&a, &b],
            &[onions()],
            GeoLocation::new(28.6139, 77.2090),
            now,
            &config,
        );

        assert_eq!(group.member_ids, vec![VendorId("raju".into()), VendorId("meena".into())]);
        assert_eq!(group.status, GroupStatus::Forming);
        assert_eq!(group.products.len(), 1);

        // 30 kg total hits the 25 kg tier: 5 rupees saved per kg.
        let line = &group.products[0];
        assert_eq!(line.bulk_price, 25.0);
        assert_eq!(line.total_savings, 150.0);
        assert_eq!(group.savings_for(&VendorId("raju".into())), 100.0);
        assert_eq!(group.savings_for(&VendorId("meena".into())), 50.0);

        assert_eq!(group.total_value, 25.0 * 30.0);
        assert_eq!(group.formation_deadline, now + Duration::minutes(30));
        assert_eq!(group.delivery_slot, now + Duration::hours(4));
    }

    #[test]
    fn duplicate_vendors_appear_once_in_membership() {
        let a = order("a", "raju", &[("onions", 10.0)]);
        let b = order("b", "raju", &[("onions", 10.0)]);
        let c = order("c", "meena", &[("onions", 10.0)]);
        assert_eq!(distinct_vendor_count(&[&a, &b, &c]), 2);

        let group = build_group(
            &[&a, &b, &c],
            &[onions()],
            GeoLocation::new(28.6139, 77.2090),
            Utc::now(),
            &FormationConfig::default(),
        );
        assert_eq!(group.member_count(), 2);
    }

    #[test]
    fn unknown_products_are_left_out_of_the_record() {
        let a = order("a", "raju", &[("onions", 20.0), ("paneer", 5.0)]);
        let b = order("b", "meena", &[("onions", 10.0)]);
        let group = build_group(
            &[&a, &b],
            &[onions()],
            GeoLocation::new(28.6139, 77.2090),
            Utc::now(),
            &FormationConfig::default(),
        );
        assert_eq!(group.products.len(), 1);
        assert_eq!(group.products[0].product_id, ProductId("onions".into()));
    }

    #[test]
    fn group_ids_are_distinct() {
        let now = Utc::now();
        assert_ne!(fresh_group_id(now), fresh_group_id(now));
    }
}
