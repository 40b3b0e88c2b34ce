//! Delhi demo dataset: vendors around Connaught Place, a small wholesale
//! catalog with bulk ladders, and one pending order waiting to be matched.

use chrono::Utc;

use saath_common::location::GeoLocation;
use saath_common::order::{Order, OrderId, OrderItem, OrderStatus, PaymentMethod};
use saath_common::product::{BulkTier, Product, ProductCategory, ProductId, Unit};
use saath_common::vendor::{Vendor, VendorId, VerificationStatus};
use saath_engine::{MarketStore, MemoryStore};

/// The wholesale market the delivery route starts from.
pub fn azadpur_mandi() -> GeoLocation {
    GeoLocation::new(28.7041, 77.1025)
}

fn vendor(id: &str, name: &str, address: &str, lat: f64, lon: f64) -> Vendor {
    Vendor {
        id: VendorId(id.into()),
        name: name.into(),
        phone: None,
        stall_address: Some(address.into()),
        stall_location: Some(GeoLocation::new(lat, lon)),
        verification_status: VerificationStatus::Verified,
        credit_limit: 5000.0,
        total_savings: 0.0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn product(
    id: &str,
    name: &str,
    category: ProductCategory,
    unit: Unit,
    base_price: f64,
    tiers: &[(f64, f64)],
) -> Product {
    Product {
        id: ProductId(id.into()),
        name: name.into(),
        category,
        unit,
        base_price,
        current_stock: 1000.0,
        supplier_id: "azadpur-supplier".into(),
        bulk_pricing: tiers
            .iter()
            .map(|(min_quantity, price_per_unit)| BulkTier {
                min_quantity: *min_quantity,
                price_per_unit: *price_per_unit,
                discount_percentage: (base_price - price_per_unit) / base_price * 100.0,
            })
            .collect(),
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn pending_order(id: &str, vendor_id: &str, items: &[(&str, &str, f64, f64)]) -> Order {
    let items: Vec<OrderItem> = items
        .iter()
        .map(|(pid, name, qty, price)| OrderItem {
            product_id: ProductId((*pid).into()),
            product_name: (*name).into(),
            quantity: *qty,
            unit_price: *price,
            total_price: qty * price,
        })
        .collect();
    let total_amount = items.iter().map(|i| i.total_price).sum();
    Order {
        id: OrderId(id.into()),
        vendor_id: VendorId(vendor_id.into()),
        items,
        total_amount,
        payment_method: PaymentMethod::Credit,
        status: OrderStatus::Pending,
        group_id: None,
        delivery_address: "Connaught Place".into(),
        delivery_location: None,
        created_at: Utc::now(),
        delivery_time: None,
    }
}

/// Store pre-loaded with the demo vendors, catalog and one matchable order.
pub fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();

    store.insert_vendor(vendor(
        "raju-chaat",
        "Raju Chaat Corner",
        "Connaught Place, New Delhi",
        28.6139,
        77.2090,
    ));
    store.insert_vendor(vendor(
        "meena-dosa",
        "Meena Dosa Point",
        "Connaught Place, New Delhi",
        28.61417,
        77.2090,
    ));
    store.insert_vendor(vendor(
        "chandni-pakora",
        "Chandni Pakora House",
        "Chandni Chowk, Delhi",
        28.6562,
        77.2410,
    ));
    store.insert_vendor(vendor(
        "noida-rolls",
        "Noida Roll Express",
        "Noida Sector 18",
        28.5355,
        77.3910,
    ));
    store.insert_vendor(vendor(
        "gurgaon-momos",
        "Gurgaon Momo Hub",
        "Gurgaon Cyber City",
        28.4595,
        77.0266,
    ));

    store.insert_product(product(
        "onions",
        "Onions",
        ProductCategory::Vegetables,
        Unit::Kg,
        30.0,
        &[(10.0, 28.0), (25.0, 25.0), (50.0, 22.0)],
    ));
    store.insert_product(product(
        "potatoes",
        "Potatoes",
        ProductCategory::Vegetables,
        Unit::Kg,
        25.0,
        &[(10.0, 23.0), (25.0, 20.0), (50.0, 18.0)],
    ));
    store.insert_product(product(
        "tomatoes",
        "Tomatoes",
        ProductCategory::Vegetables,
        Unit::Kg,
        40.0,
        &[(10.0, 38.0), (25.0, 35.0), (50.0, 32.0)],
    ));
    store.insert_product(product(
        "green-chilies",
        "Green Chilies",
        ProductCategory::Vegetables,
        Unit::Kg,
        80.0,
        &[(5.0, 75.0), (10.0, 70.0), (20.0, 65.0)],
    ));
    store.insert_product(product(
        "turmeric",
        "Turmeric Powder",
        ProductCategory::Spices,
        Unit::Kg,
        200.0,
        &[(5.0, 190.0), (10.0, 180.0)],
    ));

    // Meena's order sits pending, waiting for a neighbor to trigger a match.
    store.insert_order(pending_order(
        "o-meena-1",
        "meena-dosa",
        &[("onions", "Onions", 15.0, 30.0), ("potatoes", "Potatoes", 8.0, 25.0)],
    ));

    store
}

/// The order that triggers the pipeline: Raju, 30 m from Meena's stall,
/// also buying onions.
pub fn triggering_order(store: &MemoryStore) -> (Vendor, Order) {
    let vendor = store
        .list_vendors()
        .expect("memory store lookups cannot fail")
        .into_iter()
        .find(|v| v.id == VendorId("raju-chaat".into()))
        .expect("seeded vendor present");
    let order = pending_order(
        "o-raju-1",
        "raju-chaat",
        &[("onions", "Onions", 15.0, 30.0)],
    );
    (vendor, order)
}
