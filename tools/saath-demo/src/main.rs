//! Saath-Saath group-buying demo harness.
//!
//! Seeds an in-memory market with Delhi street-food vendors and a small
//! wholesale catalog, places a pending order from a neighboring stall, then
//! submits a triggering order and walks the full formation pipeline: nearby
//! vendors, compatible orders, projected savings, group commit. Finishes by
//! printing a nearest-neighbor delivery route over the member stalls.

mod seed;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use tracing::info;

use saath_common::vendor::VendorId;
use saath_engine::route::{optimize_route, Destination};
use saath_engine::savings::round_rupees;
use saath_engine::{FormationConfig, FormationOutcome, GroupFormationEngine, MarketStore};

#[derive(Parser)]
#[command(name = "saath-demo", about = "Saath-Saath group-buying demo harness")]
struct Cli {
    /// Matching radius around the triggering vendor's stall, in km.
    #[arg(long, default_value_t = 2.0)]
    radius_km: f64,

    /// Minimum projected savings (rupees) to form a group.
    #[arg(long, default_value_t = 50.0)]
    min_savings: f64,

    /// Recency window for compatible orders, in hours.
    #[arg(long, default_value_t = 2)]
    window_hours: i64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = FormationConfig {
        radius_km: cli.radius_km,
        minimum_savings: cli.min_savings,
        compatibility_window: chrono::Duration::hours(cli.window_hours),
        ..FormationConfig::default()
    };

    let store = seed::seeded_store();
    let (triggering_vendor, triggering_order) = seed::triggering_order(&store);
    store.insert_order(triggering_order.clone());

    info!(
        vendor = %triggering_vendor.name,
        order = %triggering_order.id.0,
        "submitting order"
    );

    let engine = GroupFormationEngine::new(store, config);
    let now = Utc::now();
    match engine.process_order(&triggering_vendor, &triggering_order, now) {
        FormationOutcome::Formed(group) => {
            println!(
                "Group {} formed: {} members, total value ₹{}, savings ₹{}",
                group.id.0,
                group.member_count(),
                round_rupees(group.total_value),
                round_rupees(group.total_savings),
            );
            for product in &group.products {
                println!(
                    "  {} x{} @ ₹{}/unit (base ₹{}) saves ₹{}",
                    product.product_name,
                    product.total_quantity,
                    product.bulk_price,
                    product.unit_price,
                    round_rupees(product.total_savings),
                );
            }
            for member in &group.member_ids {
                println!(
                    "  member {} saves ₹{}",
                    member.0,
                    round_rupees(group.savings_for(member)),
                );
            }
            println!(
                "  confirm by {}, delivery slot {}",
                group.formation_deadline.format("%H:%M"),
                group.delivery_slot.format("%H:%M"),
            );

            print_delivery_route(engine.store(), &group.member_ids)?;
        }
        FormationOutcome::Individual(reason) => {
            println!("No group formed ({reason:?}); order proceeds individually");
        }
    }

    Ok(())
}

/// Nearest-neighbor delivery route from the wholesale market to each member
/// stall.
fn print_delivery_route(store: &impl MarketStore, members: &[VendorId]) -> Result<()> {
    let vendors = store.list_vendors()?;
    let stops: Vec<Destination> = vendors
        .iter()
        .filter(|v| members.contains(&v.id))
        .filter_map(|v| {
            v.stall_location.clone().map(|location| Destination {
                location,
                vendor_id: Some(v.id.clone()),
            })
        })
        .collect();

    let route = optimize_route(seed::azadpur_mandi(), stops);
    println!(
        "Delivery route: {:.2} km, ~{} min, score {}",
        route.total_distance_km, route.total_minutes, route.optimization_score,
    );
    for point in &route.points {
        let stop = point
            .vendor_id
            .as_ref()
            .map(|v| v.0.as_str())
            .unwrap_or("Azadpur Mandi (depot)");
        match point.distance_km {
            Some(km) => println!("  -> {stop} ({km:.2} km)"),
            None => println!("  start: {stop}"),
        }
    }
    Ok(())
}
