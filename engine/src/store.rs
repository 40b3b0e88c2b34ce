use std::collections::BTreeMap;
use std::sync::Mutex;

use dashmap::DashMap;

use saath_common::group::{BuyingGroup, GroupId};
use saath_common::order::{Order, OrderId, OrderStatus};
use saath_common::product::{Product, ProductId};
use saath_common::vendor::{Vendor, VendorId};

use crate::error::{ClaimError, StoreError};

/// Seam to the backing document store.
///
/// The query surface is deliberately minimal (single-collection listings);
/// time windows, product overlap and radius filtering all happen in memory,
/// so the trait can be satisfied by a store that only supports single-field
/// filters.
pub trait MarketStore {
    fn list_vendors(&self) -> Result<Vec<Vendor>, StoreError>;

    /// Orders still in `Pending` status.
    fn list_pending_orders(&self) -> Result<Vec<Order>, StoreError>;

    /// Active products only.
    fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    /// Persist a group record under its own id (a single atomic write).
    fn create_group(&self, group: BuyingGroup) -> Result<GroupId, StoreError>;

    /// Atomically move a set of pending orders to `Grouped`, back-referencing
    /// `group_id`. All-or-nothing: if any order is missing or no longer
    /// pending, nothing changes and the claim fails. This is the optimistic
    /// lock that keeps one order from being counted into two forming groups.
    fn claim_orders(&self, order_ids: &[OrderId], group_id: &GroupId) -> Result<(), ClaimError>;

    /// Roll back a claim: grouped orders return to `Pending` and drop the
    /// group back-reference. Used when the group write fails after a claim.
    fn release_orders(&self, order_ids: &[OrderId]) -> Result<(), StoreError>;
}

/// In-memory store for tests and the demo harness.
///
/// Vendors, products and groups sit in lock-free maps; the order table lives
/// behind a single mutex because `claim_orders` is a multi-key
/// compare-and-swap and must observe all orders at once.
#[derive(Default)]
pub struct MemoryStore {
    vendors: DashMap<VendorId, Vendor>,
    products: DashMap<ProductId, Product>,
    groups: DashMap<GroupId, BuyingGroup>,
    orders: Mutex<BTreeMap<OrderId, Order>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_vendor(&self, vendor: Vendor) {
        self.vendors.insert(vendor.id.clone(), vendor);
    }

    pub fn insert_product(&self, product: Product) {
        self.products.insert(product.id.clone(), product);
    }

    pub fn insert_order(&self, order: Order) {
        self.orders
            .lock()
            .expect("order table poisoned")
            .insert(order.id.clone(), order);
    }

    pub fn get_order(&self, id: &OrderId) -> Option<Order> {
        self.orders
            .lock()
            .expect("order table poisoned")
            .get(id)
            .cloned()
    }

    pub fn get_group(&self, id: &GroupId) -> Option<BuyingGroup> {
        self.groups.get(id).map(|g| g.value().clone())
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

impl MarketStore for MemoryStore {
    fn list_vendors(&self) -> Result<Vec<Vendor>, StoreError> {
        Ok(self.vendors.iter().map(|v| v.value().clone()).collect())
    }

    fn list_pending_orders(&self) -> Result<Vec<Order>, StoreError> {
        Ok(self
            .orders
            .lock()
            .expect("order table poisoned")
            .values()
            .filter(|o| o.status == OrderStatus::Pending)
            .cloned()
            .collect())
    }

    fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self
            .products
            .iter()
            .filter(|p| p.is_active)
            .map(|p| p.value().clone())
            .collect())
    }

    fn create_group(&self, group: BuyingGroup) -> Result<GroupId, StoreError> {
        let id = group.id.clone();
        self.groups.insert(id.clone(), group);
        Ok(id)
    }

    fn claim_orders(&self, order_ids: &[OrderId], group_id: &GroupId) -> Result<(), ClaimError> {
        let mut orders = self.orders.lock().expect("order table poisoned");

        // Validate every order before touching any.
        for id in order_ids {
            match orders.get(id) {
                None => return Err(ClaimError::UnknownOrder(id.clone())),
                Some(o) if o.status != OrderStatus::Pending => {
                    return Err(ClaimError::AlreadyClaimed(id.clone()))
                }
                Some(_) => {}
            }
        }

        for id in order_ids {
            let order = orders.get_mut(id).expect("validated above");
            order.status = OrderStatus::Grouped;
            order.group_id = Some(group_id.clone());
        }
        Ok(())
    }

    fn release_orders(&self, order_ids: &[OrderId]) -> Result<(), StoreError> {
        let mut orders = self.orders.lock().expect("order table poisoned");
        for id in order_ids {
            if let Some(order) = orders.get_mut(id) {
                if order.status == OrderStatus::Grouped {
                    order.status = OrderStatus::Pending;
                    order.group_id = None;
                }
            }
        }
        Ok(())
    }
}

/// Store wrapper whose lookups always fail. Test double for degraded-path
/// behavior.
pub struct UnavailableStore;

impl MarketStore for UnavailableStore {
    fn list_vendors(&self) -> Result<Vec<Vendor>, StoreError> {
        Err(StoreError::Unavailable("vendors".into()))
    }

    fn list_pending_orders(&self) -> Result<Vec<Order>, StoreError> {
        Err(StoreError::Unavailable("orders".into()))
    }

    fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        Err(StoreError::Unavailable("products".into()))
    }

    fn create_group(&self, _group: BuyingGroup) -> Result<GroupId, StoreError> {
        Err(StoreError::Unavailable("groups".into()))
    }

    fn claim_orders(&self, _order_ids: &[OrderId], _group_id: &GroupId) -> Result<(), ClaimError> {
        Err(ClaimError::Store(StoreError::Unavailable("orders".into())))
    }

    fn release_orders(&self, _order_ids: &[OrderId]) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("orders".into()))
    }
}
