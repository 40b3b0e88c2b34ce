use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::group::GroupId;
use crate::location::GeoLocation;
use crate::product::ProductId;
use crate::vendor::VendorId;

/// Unique order identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Credit,
    /// Stock-now-pay-later micro-credit.
    Snpl,
}

/// Order lifecycle. Forward-only except cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed, waiting for group matching or confirmation.
    Pending,
    /// Claimed by a forming buying group.
    Grouped,
    /// Confirmed for fulfilment (individually or via its group).
    Confirmed,
    /// Handed over to the vendor.
    Delivered,
    /// Cancelled by the vendor or the platform.
    Cancelled,
}

impl OrderStatus {
    /// Ordinal for monotonic comparisons. Higher always wins in a merge.
    pub fn ordinal(&self) -> u8 {
        match self {
            OrderStatus::Pending => 0,
            OrderStatus::Grouped => 1,
            OrderStatus::Confirmed => 2,
            OrderStatus::Cancelled => 2,
            OrderStatus::Delivered => 3,
        }
    }

    /// Returns true if transitioning from self to `next` is valid.
    pub fn can_transition_to(&self, next: &OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Grouped)
                | (OrderStatus::Pending, OrderStatus::Confirmed)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::Grouped, OrderStatus::Confirmed)
                | (OrderStatus::Grouped, OrderStatus::Cancelled)
                // A claim rollback returns a grouped order to pending.
                | (OrderStatus::Grouped, OrderStatus::Pending)
                | (OrderStatus::Confirmed, OrderStatus::Delivered)
                | (OrderStatus::Confirmed, OrderStatus::Cancelled)
        )
    }
}

/// A single line item within an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub total_price: f64,
}

/// An order placed by a vendor for raw materials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub vendor_id: VendorId,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    /// Back-reference to the buying group that claimed this order.
    pub group_id: Option<GroupId>,
    pub delivery_address: String,
    pub delivery_location: Option<GeoLocation>,
    pub created_at: DateTime<Utc>,
    pub delivery_time: Option<DateTime<Utc>>,
}

impl Order {
    /// Product ids referenced by this order's line items.
    pub fn product_ids(&self) -> impl Iterator<Item = &ProductId> {
        self.items.iter().map(|item| &item.product_id)
    }

    /// True if the two orders share at least one product.
    pub fn shares_product_with(&self, other: &Order) -> bool {
        self.items.iter().any(|item| {
            other
                .items
                .iter()
                .any(|o| o.product_id == item.product_id)
        })
    }

    /// Total quantity of a product across this order's line items.
    pub fn quantity_of(&self, product_id: &ProductId) -> f64 {
        self.items
            .iter()
            .filter(|item| item.product_id == *product_id)
            .map(|item| item.quantity)
            .sum()
    }
}
