use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::location::GeoLocation;
use crate::product::ProductId;
use crate::vendor::VendorId;

/// Unique buying-group identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupId(pub String);

/// Buying-group lifecycle. Strictly forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupStatus {
    /// Formed, waiting for member confirmations before the deadline.
    Forming,
    /// All members confirmed; ready to order from the supplier.
    Confirmed,
    /// Supplier order placed.
    Ordered,
    /// Delivered to the member stalls.
    Delivered,
}

impl GroupStatus {
    pub fn ordinal(&self) -> u8 {
        match self {
            GroupStatus::Forming => 0,
            GroupStatus::Confirmed => 1,
            GroupStatus::Ordered => 2,
            GroupStatus::Delivered => 3,
        }
    }

    pub fn can_transition_to(&self, next: &GroupStatus) -> bool {
        next.ordinal() == self.ordinal() + 1
    }
}

/// One member's share of a group product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberContribution {
    pub vendor_id: VendorId,
    pub quantity: f64,
    /// Savings attributed to this member: savings-per-unit times their quantity.
    pub individual_savings: f64,
}

/// Per-product aggregation across all member orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupProduct {
    pub product_id: ProductId,
    pub product_name: String,
    pub total_quantity: f64,
    /// Base (individual) unit price.
    pub unit_price: f64,
    /// Unit price after resolving the bulk ladder at the aggregate quantity.
    pub bulk_price: f64,
    pub total_savings: f64,
    pub member_orders: Vec<MemberContribution>,
}

/// An immutable group record built once formation criteria are met.
///
/// Membership and product aggregation are fixed at creation; late joins are
/// not supported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyingGroup {
    pub id: GroupId,
    /// Unique member vendor ids.
    pub member_ids: Vec<VendorId>,
    pub products: Vec<GroupProduct>,
    /// Total value at bulk prices, in rupees.
    pub total_value: f64,
    pub total_savings: f64,
    pub status: GroupStatus,
    pub center_location: GeoLocation,
    pub radius_km: f64,
    pub formation_deadline: DateTime<Utc>,
    pub minimum_members: usize,
    pub delivery_slot: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BuyingGroup {
    pub fn member_count(&self) -> usize {
        self.member_ids.len()
    }

    /// Savings attributed to one vendor across all group products.
    pub fn savings_for(&self, vendor: &VendorId) -> f64 {
        self.products
            .iter()
            .flat_map(|p| p.member_orders.iter())
            .filter(|m| m.vendor_id == *vendor)
            .map(|m| m.individual_savings)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_status_is_strictly_forward() {
        use GroupStatus::*;
        assert!(Forming.can_transition_to(&Confirmed));
        assert!(Confirmed.can_transition_to(&Ordered));
        assert!(Ordered.can_transition_to(&Delivered));
        assert!(!Forming.can_transition_to(&Ordered));
        assert!(!Delivered.can_transition_to(&Forming));
        assert!(!Confirmed.can_transition_to(&Forming));
    }

    #[test]
    fn savings_for_sums_across_products() {
        let member = VendorId("v-1".into());
        let other = VendorId("v-2".into());
        let group = BuyingGroup {
            id: GroupId("g-1".into()),
            member_ids: vec![member.clone(), other.clone()],
            products: vec![
                GroupProduct {
                    product_id: ProductId("onions".into()),
                    product_name: "Onions".into(),
                    total_quantity: 30.0,
                    unit_price: 30.0,
                    bulk_price: 25.0,
                    total_savings: 150.0,
                    member_orders: vec![
                        MemberContribution { vendor_id: member.clone(), quantity: 15.0, individual_savings: 75.0 },
                        MemberContribution { vendor_id: other.clone(), quantity: 15.0, individual_savings: 75.0 },
                    ],
                },
                GroupProduct {
                    product_id: ProductId("potatoes".into()),
                    product_name: "Potatoes".into(),
                    total_quantity: 10.0,
                    unit_price: 25.0,
                    bulk_price: 23.0,
                    total_savings: 20.0,
                    member_orders: vec![MemberContribution {
                        vendor_id: member.clone(),
                        quantity: 10.0,
                        individual_savings: 20.0,
                    }],
                },
            ],
            total_value: 980.0,
            total_savings: 170.0,
            status: GroupStatus::Forming,
            center_location: GeoLocation::new(28.6139, 77.2090),
            radius_km: 2.0,
            formation_deadline: Utc::now(),
            minimum_members: 2,
            delivery_slot: Utc::now(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(group.member_count(), 2);
        assert_eq!(group.savings_for(&member), 95.0);
        assert_eq!(group.savings_for(&other), 75.0);
        assert_eq!(group.savings_for(&VendorId("v-3".into())), 0.0);
    }
}
